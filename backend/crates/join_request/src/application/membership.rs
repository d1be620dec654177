//! Membership steps
//!
//! The two best-effort calls that follow an approval: look up the join
//! request detail, then add the user to the community. Shared by the
//! approve use case and the reconcile worker.

use http::{HeaderValue, Method};
use kernel::id::{CommunityId, JoinRequestId};
use kernel::upstream::{parse_error_body, upstream_message};
use proxy::domain::upstream::{UpstreamApi, UpstreamRequest};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::domain::entity::MembershipTarget;
use crate::error::MembershipStepError;

pub fn detail_path(id: &JoinRequestId) -> String {
    format!("/community-join-request/{id}")
}

pub fn approve_path(id: &JoinRequestId) -> String {
    format!("/community-join-request/{id}/approve")
}

pub fn reject_path(id: &JoinRequestId) -> String {
    format!("/community-join-request/{id}/reject")
}

pub fn members_path(community_id: &CommunityId) -> String {
    format!("/community/{community_id}/members")
}

/// Detail lookup and member addition against upstream
pub struct MembershipSteps<U>
where
    U: UpstreamApi,
{
    upstream: Arc<U>,
}

impl<U> MembershipSteps<U>
where
    U: UpstreamApi,
{
    pub fn new(upstream: Arc<U>) -> Self {
        Self { upstream }
    }

    /// Fetch the join request and read `user_id` / `community_id`
    pub async fn resolve_target(
        &self,
        id: &JoinRequestId,
        authorization: Option<HeaderValue>,
    ) -> Result<MembershipTarget, MembershipStepError> {
        let request =
            UpstreamRequest::new(Method::GET, detail_path(id)).with_authorization(authorization);
        let response = self.upstream.send(request).await?;

        if !response.is_success() {
            return Err(status_error(response.status, &response.body));
        }

        let body: Value = serde_json::from_slice(&response.body).unwrap_or(Value::Null);
        MembershipTarget::from_detail(&body).ok_or(MembershipStepError::MissingIds)
    }

    /// Add the user to the community. 409 (already a member) counts as done.
    pub async fn add_member(
        &self,
        target: &MembershipTarget,
        authorization: Option<HeaderValue>,
    ) -> Result<(), MembershipStepError> {
        let payload = json!({ "user_id": target.user_id.as_str() });
        let request = UpstreamRequest::new(Method::POST, members_path(&target.community_id))
            .with_authorization(authorization)
            .with_json(payload.to_string().into());
        let response = self.upstream.send(request).await?;

        match response.status {
            200..=299 => Ok(()),
            409 => {
                tracing::debug!(
                    user_id = %target.user_id,
                    community_id = %target.community_id,
                    "User already a member"
                );
                Ok(())
            }
            status => Err(status_error(status, &response.body)),
        }
    }
}

fn status_error(status: u16, body: &[u8]) -> MembershipStepError {
    let message = upstream_message(&parse_error_body(body))
        .unwrap_or_else(|| "no message".to_string());
    MembershipStepError::Status { status, message }
}
