//! Reject Join Request Use Case

use http::{HeaderValue, Method};
use kernel::id::JoinRequestId;
use proxy::application::forward::{ForwardOutput, ForwardUseCase};
use proxy::domain::route::JOIN_REQUEST_REJECT;
use proxy::domain::upstream::{UpstreamApi, UpstreamRequest};
use std::sync::Arc;

use crate::application::membership::reject_path;
use crate::error::JoinRequestResult;

/// Reject Join Request Use Case
pub struct RejectJoinRequestUseCase<U>
where
    U: UpstreamApi,
{
    upstream: Arc<U>,
}

impl<U> RejectJoinRequestUseCase<U>
where
    U: UpstreamApi,
{
    pub fn new(upstream: Arc<U>) -> Self {
        Self { upstream }
    }

    pub async fn execute(
        &self,
        id: &JoinRequestId,
        authorization: Option<HeaderValue>,
    ) -> JoinRequestResult<ForwardOutput> {
        let request =
            UpstreamRequest::new(Method::POST, reject_path(id)).with_authorization(authorization);
        let response = ForwardUseCase::new(self.upstream.clone())
            .execute(&JOIN_REQUEST_REJECT, request)
            .await?;

        tracing::info!(join_request_id = %id, "Join request rejected");
        Ok(response)
    }
}
