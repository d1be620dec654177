//! Proxy Gateway
//!
//! Browser-facing route handlers that forward each request to exactly one
//! upstream endpoint:
//! - `domain/` - Route wording, failure normalization, upstream port
//! - `application/` - Forward and dataset-upload use cases, configuration
//! - `infra/` - reqwest implementation of the upstream port
//! - `presentation/` - Axum handlers and router
//!
//! ## Contract
//! - `Authorization` is forwarded verbatim
//! - Success bodies pass through unchanged, upstream status preserved
//! - Failures become `{error, backendStatus, backendError}`, upstream
//!   status preserved
//! - Uploads declaring a length over the ceiling get 413 without
//!   contacting upstream; the file itself is streamed, never buffered

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ProxyConfig;
pub use application::forward::{ForwardOutput, ForwardUseCase};
pub use application::upload::{UploadBudget, UploadDatasetUseCase};
pub use domain::failure::{ProxyErrorBody, normalize_failure};
pub use domain::route::RouteMessages;
pub use domain::upstream::{
    DatasetUpload, ForwardBody, UploadAborted, UploadPart, UploadStream, UpstreamApi,
    UpstreamRequest,
};
pub use error::{ProxyError, ProxyResult};
pub use infra::http::HttpUpstream;
pub use presentation::router::proxy_router;

#[cfg(test)]
mod tests;
