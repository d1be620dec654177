//! Canonical success envelope
//!
//! Every upstream success body is `{status, message, data}`. Clients decode
//! into [`ApiEnvelope<T>`]; the proxy passes the body through untouched.

use serde::{Deserialize, Serialize};

/// `{ status: bool, message: string, data: T }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

fn default_status() -> bool {
    true
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: true,
            message: String::new(),
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Transform the payload, keeping status and message
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiEnvelope<U> {
        ApiEnvelope {
            status: self.status,
            message: self.message,
            data: f(self.data),
        }
    }
}
