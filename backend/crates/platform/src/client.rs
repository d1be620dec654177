//! Client credential utilities
//!
//! The caller's `Authorization` header is forwarded to upstream untouched;
//! the typed client builds its own bearer header from a session token.

use axum::http::{HeaderMap, HeaderValue, header};

/// Error when building credentials
#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("Malformed authorization header")]
    Malformed,
}

/// Raw `Authorization` header, forwarded verbatim to upstream
pub fn forwarded_authorization(headers: &HeaderMap) -> Option<HeaderValue> {
    headers.get(header::AUTHORIZATION).cloned()
}

/// Build an `Authorization: Bearer` header value
pub fn bearer_header(token: &str) -> Result<HeaderValue, CredentialError> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| CredentialError::Malformed)?;
    value.set_sensitive(true);
    Ok(value)
}
