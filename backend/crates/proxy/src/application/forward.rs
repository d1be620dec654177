//! Forward Use Case
//!
//! One browser request, one upstream call. Success bodies pass through
//! unchanged with the upstream status; failures are normalized but keep
//! the upstream status.

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use platform::upstream::UpstreamResponse;
use std::sync::Arc;

use crate::domain::failure::normalize_failure;
use crate::domain::route::RouteMessages;
use crate::domain::upstream::{UpstreamApi, UpstreamRequest};
use crate::error::{ProxyError, ProxyResult};

/// Upstream success, ready to hand back to the browser
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl ForwardOutput {
    pub fn from_upstream(response: UpstreamResponse) -> Self {
        Self {
            status: StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK),
            content_type: response.headers.get(header::CONTENT_TYPE).cloned(),
            body: response.body,
        }
    }

    /// Body decoded as JSON, `Null` when empty or not JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

impl IntoResponse for ForwardOutput {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

/// Forward Use Case
pub struct ForwardUseCase<U>
where
    U: UpstreamApi,
{
    upstream: Arc<U>,
}

impl<U> ForwardUseCase<U>
where
    U: UpstreamApi,
{
    pub fn new(upstream: Arc<U>) -> Self {
        Self { upstream }
    }

    pub async fn execute(
        &self,
        messages: &RouteMessages,
        request: UpstreamRequest,
    ) -> ProxyResult<ForwardOutput> {
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self
            .upstream
            .send(request)
            .await
            .map_err(|source| ProxyError::Unreachable {
                fallback: messages.fallback,
                source,
            })?;

        if response.is_success() {
            tracing::debug!(%method, %path, status = response.status, "Forwarded");
            return Ok(ForwardOutput::from_upstream(response));
        }

        let body = normalize_failure(response.status, &response.body, messages);
        tracing::info!(
            %method,
            %path,
            status = response.status,
            error = %body.error,
            "Upstream returned failure"
        );
        Err(ProxyError::Upstream {
            status: response.status,
            body,
        })
    }
}
