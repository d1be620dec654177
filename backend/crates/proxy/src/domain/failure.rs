//! Failure normalization
//!
//! Every proxy route reports upstream failures as
//! `{ error, backendStatus, backendError }` with the proxy status equal to
//! the upstream status. Message precedence:
//!
//! 1. status override: 401 always, 403 / 404 with route wording, 413 with
//!    route wording when the route defines one
//! 2. upstream `detail` (string, flattened validation array, object)
//! 3. upstream `message`
//! 4. route fallback

use kernel::upstream::{parse_error_body, upstream_message};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::route::{AUTH_FAILED, RouteMessages};

/// Browser-facing failure body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyErrorBody {
    pub error: String,
    /// Upstream status; `null` when upstream was never reached
    pub backend_status: Option<u16>,
    /// Upstream body (raw text wrapped as `{message}`)
    pub backend_error: Value,
}

impl ProxyErrorBody {
    /// Failure produced by the gateway itself
    pub fn local(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            backend_status: None,
            backend_error: Value::Null,
        }
    }
}

/// Normalize an upstream failure response
pub fn normalize_failure(status: u16, body: &[u8], messages: &RouteMessages) -> ProxyErrorBody {
    let backend_error = parse_error_body(body);
    let error = failure_message(status, &backend_error, messages);

    ProxyErrorBody {
        error,
        backend_status: Some(status),
        backend_error,
    }
}

fn failure_message(status: u16, body: &Value, messages: &RouteMessages) -> String {
    let overridden = match status {
        401 => Some(AUTH_FAILED),
        403 => Some(messages.forbidden),
        404 => Some(messages.not_found),
        413 => messages.too_large,
        _ => None,
    };

    overridden
        .map(str::to_string)
        .or_else(|| upstream_message(body))
        .unwrap_or_else(|| messages.fallback.to_string())
}
