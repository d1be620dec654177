//! Presentation Layer
//!
//! Axum handlers and the gateway router.

pub mod handlers;
pub mod multipart;
pub mod router;
