//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Upstream HTTP transport (reqwest) with a fixed base URL
//! - Header helpers (bearer credentials, client IP)
//! - Environment configuration helpers

pub mod client;
pub mod config;
pub mod upstream;
