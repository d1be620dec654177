//! Domain Layer
//!
//! Session model, outbound request description and the ports the
//! application layer depends on.

pub mod navigation;
pub mod request;
pub mod session;
pub mod store;
