//! Application Layer - Use Cases

pub mod approve;
pub mod config;
pub mod membership;
pub mod reconcile;
pub mod reject;
