//! Shared Kernel - vocabulary every gateway crate agrees on
//!
//! This crate contains the small core that the client, proxy and
//! orchestrator crates all speak:
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - The canonical success envelope (`{status, message, data}`)
//! - Upstream error-body normalization shared by every route
//! - Typed identifiers for upstream resources
//!
//! **Design Principle**: only things whose meaning is identical on both
//! sides of the proxy live here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod envelope;
pub mod id;
pub mod upstream;
