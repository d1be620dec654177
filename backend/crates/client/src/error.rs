//! Request Client Error Types
//!
//! Client-side error taxonomy. Converts into `kernel::error::AppError`
//! so UI layers that already speak the unified type can surface it.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::upstream::{flatten_validation_detail, parse_error_body};
use platform::upstream::UpstreamError;
use serde_json::Value;
use thiserror::Error;

/// Request Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced to call sites
///
/// An unresolved credential expiry is not a separate variant: the caller
/// observes the original 401 as [`ClientError::Http`] after the session has
/// been torn down.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No HTTP response at all (DNS, connect, reset)
    #[error("Network error: {0}")]
    Transport(#[from] UpstreamError),

    /// Non-2xx response
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        detail: Option<Value>,
    },

    /// HTTP 422 with a structured field-error array, flattened
    #[error("{message}")]
    Validation { message: String, detail: Value },

    /// 2xx response whose body is not the expected envelope
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Session storage could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Request could not be built (bad header, bad path)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Classify a non-2xx response.
    ///
    /// 422 bodies carrying a validation array become [`ClientError::Validation`];
    /// everything else keeps the generic `HTTP error! status: <code>` message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let detail = parse_error_body(body);

        if status == 422 {
            if let Some(message) = detail
                .get("detail")
                .and_then(Value::as_array)
                .and_then(|items| flatten_validation_detail(items))
            {
                return ClientError::Validation { message, detail };
            }
        }

        let detail = match &detail {
            Value::Object(map) if map.is_empty() => None,
            _ => Some(detail),
        };

        ClientError::Http {
            status,
            message: format!("HTTP error! status: {status}"),
            detail,
        }
    }

    /// HTTP status carried by the error, if there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Validation { .. } => Some(422),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Upstream body attached to the error
    pub fn detail(&self) -> Option<&Value> {
        match self {
            ClientError::Http { detail, .. } => detail.as_ref(),
            ClientError::Validation { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Http { status, .. } => ErrorKind::from_status(*status),
            ClientError::Validation { .. } => ErrorKind::UnprocessableEntity,
            ClientError::Transport(_) => ErrorKind::BadGateway,
            ClientError::Decode(_) => ErrorKind::BadGateway,
            ClientError::InvalidRequest(_) => ErrorKind::BadRequest,
            ClientError::Storage(_) | ClientError::Configuration(_) => {
                ErrorKind::InternalServerError
            }
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let app = AppError::new(err.kind(), err.to_string());
        match err.detail().cloned() {
            Some(detail) => app.with_detail(detail),
            None => app,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
