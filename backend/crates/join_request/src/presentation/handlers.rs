//! HTTP Handlers

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use kernel::id::JoinRequestId;
use platform::client::forwarded_authorization;
use proxy::application::forward::ForwardOutput;
use proxy::domain::upstream::UpstreamApi;
use std::sync::Arc;

use crate::application::approve::ApproveJoinRequestUseCase;
use crate::application::reject::RejectJoinRequestUseCase;
use crate::domain::repository::MembershipOutbox;
use crate::error::JoinRequestResult;

/// Shared state for join-request handlers
pub struct JoinRequestState<U, O>
where
    U: UpstreamApi + Send + Sync + 'static,
    O: MembershipOutbox + Send + Sync + 'static,
{
    pub upstream: Arc<U>,
    pub outbox: Arc<O>,
}

impl<U, O> Clone for JoinRequestState<U, O>
where
    U: UpstreamApi + Send + Sync + 'static,
    O: MembershipOutbox + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            outbox: self.outbox.clone(),
        }
    }
}

/// POST /api/community-join-request/{id}/approve
///
/// Responds with the upstream approve response whatever happens to the
/// membership addition.
pub async fn approve<U, O>(
    State(state): State<JoinRequestState<U, O>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> JoinRequestResult<ForwardOutput>
where
    U: UpstreamApi + Send + Sync + 'static,
    O: MembershipOutbox + Send + Sync + 'static,
{
    let id = JoinRequestId::new(id)?;

    let use_case = ApproveJoinRequestUseCase::new(state.upstream.clone(), state.outbox.clone());
    let output = use_case
        .execute(&id, forwarded_authorization(&headers))
        .await?;

    tracing::debug!(join_request_id = %id, membership = ?output.membership, "Approve finished");

    Ok(output.response)
}

/// POST /api/community-join-request/{id}/reject
pub async fn reject<U, O>(
    State(state): State<JoinRequestState<U, O>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> JoinRequestResult<ForwardOutput>
where
    U: UpstreamApi + Send + Sync + 'static,
    O: MembershipOutbox + Send + Sync + 'static,
{
    let id = JoinRequestId::new(id)?;

    RejectJoinRequestUseCase::new(state.upstream.clone())
        .execute(&id, forwarded_authorization(&headers))
        .await
}
