//! HTTP Handlers

use axum::Json;
use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, header};
use http_body_util::LengthLimitError;
use platform::client::forwarded_authorization;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::application::config::ProxyConfig;
use crate::application::forward::{ForwardOutput, ForwardUseCase};
use crate::application::upload::UploadDatasetUseCase;
use crate::domain::route::RouteMessages;
use crate::domain::upstream::{UpstreamApi, UpstreamRequest};
use crate::error::{ProxyError, ProxyResult};
use crate::presentation::multipart::{self, UploadReader};

/// Shared state for proxy handlers
#[derive(Clone)]
pub struct ProxyState<U>
where
    U: UpstreamApi + Clone + Send + Sync + 'static,
{
    pub upstream: Arc<U>,
    pub config: Arc<ProxyConfig>,
}

/// Forward the request as-is to the same path upstream.
///
/// Method, path, query, `Authorization`, body and its `Content-Type` are
/// carried over.
pub async fn forward<U>(
    state: ProxyState<U>,
    messages: &'static RouteMessages,
    request: Request,
) -> ProxyResult<ForwardOutput>
where
    U: UpstreamApi + Clone + Send + Sync + 'static,
{
    let (parts, body) = request.into_parts();

    let limit = state.config.max_json_bytes;
    if content_length(&parts.headers).is_some_and(|len| len > limit as u64) {
        return Err(body_too_large(limit));
    }
    let body = to_bytes(body, limit).await.map_err(|e| {
        let e = e.into_inner();
        if e.is::<LengthLimitError>() {
            body_too_large(limit)
        } else {
            ProxyError::InvalidRequest(format!("failed to read body: {e}"))
        }
    })?;

    let upstream_request = UpstreamRequest::new(parts.method, parts.uri.path())
        .with_query(parts.uri.query().map(str::to_string))
        .authorized_by(&parts.headers)
        .with_body_from(&parts.headers, body);

    ForwardUseCase::new(state.upstream.clone())
        .execute(messages, upstream_request)
        .await
}

/// POST /api/datasets/upload
pub async fn upload_dataset<U>(
    State(state): State<ProxyState<U>>,
    request: Request,
) -> ProxyResult<ForwardOutput>
where
    U: UpstreamApi + Clone + Send + Sync + 'static,
{
    let use_case = UploadDatasetUseCase::new(state.upstream.clone(), state.config.clone());

    let budget = use_case.budget();
    budget.check_declared(content_length(request.headers()))?;

    let authorization = forwarded_authorization(request.headers());
    let multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|e| ProxyError::Multipart(e.body_text()))?;

    let UploadReader { upload, task } = UploadReader::spawn(multipart, budget);
    let Ok(upload) = upload.await else {
        multipart::finish(task).await?;
        return Err(ProxyError::InvalidRequest("No file provided".to_string()));
    };

    let forwarded = use_case.execute(authorization, upload).await;
    // A failed read is why the forward failed
    multipart::finish(task).await?;
    forwarded
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn body_too_large(limit: usize) -> ProxyError {
    ProxyError::PayloadTooLarge {
        message: format!("Request body exceeds {limit} bytes"),
        limit: limit as u64,
    }
}
