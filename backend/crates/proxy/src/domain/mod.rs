//! Domain Layer
//!
//! Route wording, failure normalization and the upstream port.

pub mod failure;
pub mod route;
pub mod upstream;
