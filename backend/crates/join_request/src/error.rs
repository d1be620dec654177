//! Join Request Error Types
//!
//! A failed primary call is returned as the proxy's own error so the
//! browser sees exactly what upstream said. Best-effort steps have their
//! own [`MembershipStepError`] which never reaches the browser.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::IdError;
use platform::upstream::UpstreamError;
use proxy::error::ProxyError;
use thiserror::Error;

/// Join request result type alias
pub type JoinRequestResult<T> = Result<T, JoinRequestError>;

#[derive(Debug, Error)]
pub enum JoinRequestError {
    /// Primary upstream call failed
    #[error(transparent)]
    Upstream(#[from] ProxyError),

    /// Path id rejected before any upstream call
    #[error("Invalid join request id: {0}")]
    InvalidId(#[from] IdError),

    /// Outbox storage error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored outbox row could not be read back
    #[error("Corrupt outbox entry: {0}")]
    CorruptEntry(String),
}

impl JoinRequestError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            JoinRequestError::Upstream(e) => e.status_code(),
            JoinRequestError::InvalidId(_) => StatusCode::BAD_REQUEST,
            JoinRequestError::Database(_) | JoinRequestError::CorruptEntry(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status_code().as_u16())
    }

    fn log(&self) {
        match self {
            JoinRequestError::Database(e) => {
                tracing::error!(error = %e, "Outbox database error");
            }
            JoinRequestError::CorruptEntry(msg) => {
                tracing::error!(message = %msg, "Corrupt outbox entry");
            }
            _ => {
                tracing::debug!(error = %self, "Join request error");
            }
        }
    }
}

impl From<JoinRequestError> for AppError {
    fn from(err: JoinRequestError) -> Self {
        match err {
            JoinRequestError::Upstream(e) => e.into(),
            JoinRequestError::Database(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for JoinRequestError {
    fn into_response(self) -> Response {
        match self {
            JoinRequestError::Upstream(e) => e.into_response(),
            JoinRequestError::InvalidId(e) => {
                ProxyError::InvalidRequest(e.to_string()).into_response()
            }
            other => {
                other.log();
                AppError::from(other).into_response()
            }
        }
    }
}

/// Why a best-effort membership step did not complete
#[derive(Debug, Error)]
pub enum MembershipStepError {
    #[error("upstream unreachable: {0}")]
    Transport(#[from] UpstreamError),

    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("join request detail is missing user_id or community_id")]
    MissingIds,
}

impl MembershipStepError {
    /// Failures that will not go away by retrying
    pub fn is_permanent(&self) -> bool {
        match self {
            MembershipStepError::Status { status, .. } => {
                matches!(status, 400 | 401 | 403 | 404 | 422)
            }
            MembershipStepError::MissingIds => true,
            MembershipStepError::Transport(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_keeps_status() {
        let err = JoinRequestError::Upstream(ProxyError::Upstream {
            status: 403,
            body: proxy::ProxyErrorBody::local("no"),
        });
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_permanent_step_failures() {
        assert!(MembershipStepError::MissingIds.is_permanent());
        assert!(
            MembershipStepError::Status {
                status: 404,
                message: String::new()
            }
            .is_permanent()
        );
        assert!(
            MembershipStepError::Status {
                status: 401,
                message: String::new()
            }
            .is_permanent()
        );
        assert!(
            !MembershipStepError::Status {
                status: 500,
                message: String::new()
            }
            .is_permanent()
        );
    }
}
