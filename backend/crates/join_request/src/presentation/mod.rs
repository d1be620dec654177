//! Presentation Layer
//!
//! HTTP handlers for the join-request decision routes.

pub mod handlers;
pub mod router;
