//! Send Use Case
//!
//! Executes one call with credential injection and the one-shot
//! refresh-and-retry policy:
//!
//! 1. attach `Authorization: Bearer <access_token>` unless the caller set
//!    their own `Authorization`
//! 2. on 401 for the first attempt, ask the [`SessionManager`] for a fresh
//!    session and send the original envelope once more
//! 3. a second 401, a failed refresh, or any other failure is returned as is

use http::header::{self, HeaderMap, HeaderValue};
use platform::client::bearer_header;
use platform::upstream::{UpstreamClient, UpstreamResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::application::config::ClientConfig;
use crate::application::session_manager::{RefreshOutcome, SessionManager};
use crate::domain::navigation::SignInRedirect;
use crate::domain::request::{RequestBody, RequestEnvelope};
use crate::domain::session::AccessToken;
use crate::domain::store::SessionStore;
use crate::error::{ClientError, ClientResult};
use kernel::envelope::ApiEnvelope;

/// Highest attempt index; attempt 0 is the original call, 1 the retry
const MAX_ATTEMPT: u8 = 1;

/// Authenticated request client
pub struct RequestClient<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub(crate) upstream: UpstreamClient,
    pub(crate) sessions: Arc<SessionManager<S>>,
    pub(crate) config: Arc<ClientConfig>,
}

impl<S> Clone for RequestClient<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            sessions: self.sessions.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> RequestClient<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub fn new(
        config: ClientConfig,
        store: Arc<S>,
        redirect: Arc<dyn SignInRedirect>,
    ) -> ClientResult<Self> {
        let upstream = UpstreamClient::new(config.base_url(), None)
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        let config = Arc::new(config);
        let sessions = Arc::new(SessionManager::new(
            store,
            upstream.clone(),
            redirect,
            config.clone(),
        ));

        Ok(Self {
            upstream,
            sessions,
            config,
        })
    }

    pub fn sessions(&self) -> &Arc<SessionManager<S>> {
        &self.sessions
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send and decode the `{status, message, data}` envelope
    pub async fn send<T: DeserializeOwned>(
        &self,
        envelope: &RequestEnvelope,
    ) -> ClientResult<ApiEnvelope<T>> {
        let response = self.dispatch(envelope, 0).await?;
        decode_envelope(&response.body)
    }

    /// Send and return the decoded JSON body untouched
    pub async fn send_raw(&self, envelope: &RequestEnvelope) -> ClientResult<Value> {
        let response = self.dispatch(envelope, 0).await?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    async fn dispatch(
        &self,
        envelope: &RequestEnvelope,
        attempt: u8,
    ) -> ClientResult<UpstreamResponse> {
        let mut attempt = attempt;
        loop {
            let attached = self.sessions.access_token().await?;
            let response = self.execute_once(envelope, attached.as_ref()).await?;

            if response.is_success() {
                return Ok(response);
            }

            if response.status != 401 || attempt >= MAX_ATTEMPT {
                tracing::debug!(
                    status = response.status,
                    method = %envelope.method,
                    path = %envelope.path,
                    attempt,
                    "Request failed"
                );
                return Err(ClientError::from_response(response.status, &response.body));
            }

            let outcome = match self.sessions.refresh_after_rejection(attached.as_ref()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "Session refresh aborted by storage error");
                    RefreshOutcome::Failed
                }
            };

            if outcome.session().is_none() {
                // Retry abandoned; the caller sees the original 401.
                return Err(ClientError::from_response(response.status, &response.body));
            }

            tracing::debug!(path = %envelope.path, "Retrying after credential refresh");
            attempt += 1;
        }
    }

    async fn execute_once(
        &self,
        envelope: &RequestEnvelope,
        access_token: Option<&AccessToken>,
    ) -> ClientResult<UpstreamResponse> {
        let headers = merge_headers(&envelope.headers, access_token)?;

        let mut request = self
            .upstream
            .request(envelope.method.clone(), &envelope.path, None)
            .headers(headers);

        if !envelope.query.is_empty() {
            request = request.query(&envelope.query);
        }

        request = match &envelope.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(parts) => request.multipart(build_form(parts)?),
        };

        Ok(self.upstream.execute(request).await?)
    }
}

/// Caller headers plus the bearer credential. A caller-supplied
/// `Authorization` is kept as is.
fn merge_headers(caller: &HeaderMap, access_token: Option<&AccessToken>) -> ClientResult<HeaderMap> {
    let mut headers = caller.clone();
    headers
        .entry(header::ACCEPT)
        .or_insert(HeaderValue::from_static("application/json"));

    if let Some(token) = access_token {
        if !headers.contains_key(header::AUTHORIZATION) {
            let value = bearer_header(token.as_str())
                .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
    }
    Ok(headers)
}

fn build_form(parts: &[crate::domain::request::FormPart]) -> ClientResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut field = reqwest::multipart::Part::bytes(part.bytes.to_vec());
        if let Some(file_name) = &part.file_name {
            field = field.file_name(file_name.clone());
        }
        if let Some(content_type) = &part.content_type {
            field = field
                .mime_str(content_type)
                .map_err(|e| ClientError::InvalidRequest(format!("content type: {e}")))?;
        }
        form = form.part(part.name.clone(), field);
    }
    Ok(form)
}

fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> ClientResult<ApiEnvelope<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        // 204 and friends
        return Ok(serde_json::from_value(serde_json::json!({
            "status": true,
            "message": "",
            "data": null
        }))?);
    }
    Ok(serde_json::from_slice(body)?)
}
