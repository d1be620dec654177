//! Proxy Error Types
//!
//! Every variant renders as a [`ProxyErrorBody`]. Upstream failures keep
//! the upstream status; gateway-side failures pick their own.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::upstream::UpstreamError;
use thiserror::Error;

use crate::domain::failure::ProxyErrorBody;

/// Proxy result type alias
pub type ProxyResult<T> = Result<T, ProxyError>;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream answered with a non-2xx status
    #[error("{}", body.error)]
    Upstream { status: u16, body: ProxyErrorBody },

    /// Upstream could not be reached
    #[error("{fallback}: {source}")]
    Unreachable {
        fallback: &'static str,
        #[source]
        source: UpstreamError,
    },

    /// Body exceeds the configured ceiling
    #[error("{message}")]
    PayloadTooLarge { message: String, limit: u64 },

    /// Malformed multipart body
    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProxyError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Multipart(_) | ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status_code().as_u16())
    }

    /// Upstream status, when upstream answered
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            ProxyError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Browser-facing body
    pub fn body(&self) -> ProxyErrorBody {
        match self {
            ProxyError::Upstream { body, .. } => body.clone(),
            ProxyError::Unreachable { fallback, .. } => ProxyErrorBody::local(*fallback),
            other => ProxyErrorBody::local(other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            ProxyError::Upstream { status, body } if *status >= 500 => {
                tracing::error!(status, error = %body.error, "Upstream failure");
            }
            ProxyError::Upstream { status, body } => {
                tracing::debug!(status, error = %body.error, "Upstream rejected request");
            }
            ProxyError::Unreachable { source, .. } => {
                tracing::error!(error = %source, "Upstream unreachable");
            }
            ProxyError::PayloadTooLarge { limit, .. } => {
                tracing::warn!(limit, "Upload rejected: payload too large");
            }
            _ => {
                tracing::debug!(error = %self, "Proxy error");
            }
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        let kind = err.kind();
        let body = err.body();
        let app = AppError::new(kind, body.error);
        if body.backend_error.is_null() {
            app
        } else {
            app.with_detail(body.backend_error)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}
