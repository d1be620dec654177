//! Application Error - Unified error type for the gateway
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use serde_json::Value;

use super::kind::ErrorKind;

/// Unified application error.
///
/// Feature crates keep their own `thiserror` enums and convert into this
/// type at the HTTP boundary. Built with a small builder API.
///
/// ## Fields
/// * `kind` - classification, maps to the HTTP status
/// * `message` - human readable message shown to the browser
/// * `detail` - optional structured payload (usually the upstream body)
/// * `source` - optional underlying error, never serialized
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::NotFound, "Community not found");
/// let err = AppError::bad_gateway("Failed to fetch communities")
///     .with_detail(serde_json::json!({ "detail": "upstream down" }));
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    detail: Option<Value>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// `Result<T, AppError>`
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    // ========================================================================
    // Constructors
    // ========================================================================

    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: None,
        }
    }

    /// Build from a raw HTTP status (e.g. one returned by the upstream API)
    #[inline]
    pub fn from_status(status: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::from_status(status), message)
    }

    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    #[inline]
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    #[inline]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[inline]
    pub fn payload_too_large(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::PayloadTooLarge, message)
    }

    #[inline]
    pub fn unprocessable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UnprocessableEntity, message)
    }

    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    #[inline]
    pub fn bad_gateway(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadGateway, message)
    }

    #[inline]
    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Attach a structured payload, typically the original upstream body
    #[inline]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    #[inline]
    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(detail) = &self.detail {
            builder.field("detail", detail);
        }
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_status_keeps_upstream_code() {
        let err = AppError::from_status(403, "Access denied");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Access denied");
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(AppError::bad_request("x").status_code(), 400);
        assert_eq!(AppError::unauthorized("x").status_code(), 401);
        assert_eq!(AppError::payload_too_large("x").status_code(), 413);
        assert_eq!(AppError::unprocessable("x").status_code(), 422);
        assert_eq!(AppError::bad_gateway("x").status_code(), 502);
    }

    #[test]
    fn test_with_detail() {
        let err = AppError::unprocessable("Validation failed")
            .with_detail(json!({ "detail": [{ "loc": ["body"], "msg": "bad" }] }));
        assert!(err.detail().is_some());
        assert!(format!("{err:?}").contains("detail"));
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::unauthorized("Session expired");
        assert_eq!(err.to_string(), "[Unauthorized] Session expired");
    }

    #[test]
    fn test_source_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = AppError::bad_gateway("Upstream unreachable").with_source(io);
        assert_eq!(err.status_code(), 502);
        assert!(err.source().is_some());
    }
}
