//! Infrastructure Layer
//!
//! Session storage backends and sign-in redirect implementations.

pub mod file;
pub mod memory;
pub mod redirect;
