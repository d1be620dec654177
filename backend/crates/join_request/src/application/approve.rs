//! Approve Join Request Use Case
//!
//! 1. approve upstream (must succeed, error returned verbatim)
//! 2. fetch the join request detail for `user_id` / `community_id`
//! 3. add the user to the community
//! 4. return the step 1 response
//!
//! Steps 2 and 3 never change the response. When either fails the
//! membership is queued in the outbox and the reconcile worker finishes it.

use http::{HeaderValue, Method};
use kernel::id::JoinRequestId;
use proxy::application::forward::{ForwardOutput, ForwardUseCase};
use proxy::domain::route::JOIN_REQUEST_APPROVE;
use proxy::domain::upstream::{UpstreamApi, UpstreamRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::membership::{MembershipSteps, approve_path};
use crate::domain::entity::{MembershipTarget, PendingMembership};
use crate::domain::repository::MembershipOutbox;
use crate::error::{JoinRequestResult, MembershipStepError};

/// What happened to the membership addition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipOutcome {
    /// Added inline
    Added,
    /// Queued for the reconcile worker
    Queued { entry_id: Uuid },
    /// Could not be added nor queued; only the logs know
    Lost,
}

/// Output DTO for approve
#[derive(Debug, Clone)]
pub struct ApproveOutput {
    /// Upstream approve response, passed through to the browser
    pub response: ForwardOutput,
    pub membership: MembershipOutcome,
}

/// Approve Join Request Use Case
pub struct ApproveJoinRequestUseCase<U, O>
where
    U: UpstreamApi,
    O: MembershipOutbox,
{
    upstream: Arc<U>,
    outbox: Arc<O>,
}

impl<U, O> ApproveJoinRequestUseCase<U, O>
where
    U: UpstreamApi,
    O: MembershipOutbox,
{
    pub fn new(upstream: Arc<U>, outbox: Arc<O>) -> Self {
        Self { upstream, outbox }
    }

    pub async fn execute(
        &self,
        id: &JoinRequestId,
        authorization: Option<HeaderValue>,
    ) -> JoinRequestResult<ApproveOutput> {
        let request = UpstreamRequest::new(Method::POST, approve_path(id))
            .with_authorization(authorization.clone());
        let response = ForwardUseCase::new(self.upstream.clone())
            .execute(&JOIN_REQUEST_APPROVE, request)
            .await?;

        tracing::info!(join_request_id = %id, "Join request approved");

        let membership = self.add_membership(id, authorization).await;

        Ok(ApproveOutput {
            response,
            membership,
        })
    }

    async fn add_membership(
        &self,
        id: &JoinRequestId,
        authorization: Option<HeaderValue>,
    ) -> MembershipOutcome {
        let steps = MembershipSteps::new(self.upstream.clone());

        let target = match steps.resolve_target(id, authorization.clone()).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(
                    join_request_id = %id,
                    error = %e,
                    "Join request detail unavailable after approval"
                );
                return self.queue(id, None, &e).await;
            }
        };

        match steps.add_member(&target, authorization.clone()).await {
            Ok(()) => {
                tracing::info!(
                    join_request_id = %id,
                    user_id = %target.user_id,
                    community_id = %target.community_id,
                    "User added to community"
                );
                MembershipOutcome::Added
            }
            Err(e) => {
                tracing::warn!(
                    join_request_id = %id,
                    user_id = %target.user_id,
                    community_id = %target.community_id,
                    error = %e,
                    "Failed to add user to community after approval"
                );
                self.queue(id, Some(target), &e).await
            }
        }
    }

    async fn queue(
        &self,
        id: &JoinRequestId,
        target: Option<MembershipTarget>,
        error: &MembershipStepError,
    ) -> MembershipOutcome {
        // The caller's token is not persisted; the worker uses its own
        let entry = PendingMembership::new(id.clone(), target, error.to_string());

        match self.outbox.enqueue(&entry).await {
            Ok(()) => {
                tracing::info!(
                    join_request_id = %id,
                    entry_id = %entry.id,
                    "Membership queued for reconciliation"
                );
                MembershipOutcome::Queued { entry_id: entry.id }
            }
            Err(e) => {
                tracing::error!(
                    join_request_id = %id,
                    error = %e,
                    "Failed to queue membership; user is approved but not a member"
                );
                MembershipOutcome::Lost
            }
        }
    }
}
