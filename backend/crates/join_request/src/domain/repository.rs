//! Repository Traits

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::PendingMembership;
use crate::error::JoinRequestResult;

/// Durable queue of membership additions owed to upstream
#[trait_variant::make(MembershipOutbox: Send)]
pub trait LocalMembershipOutbox {
    /// Record an entry. An open entry for the same join request is replaced.
    async fn enqueue(&self, entry: &PendingMembership) -> JoinRequestResult<()>;

    /// Pending entries whose `next_attempt_at` has passed, oldest first
    async fn due(&self, now: DateTime<Utc>, limit: usize) -> JoinRequestResult<Vec<PendingMembership>>;

    /// Membership reached upstream
    async fn mark_done(&self, id: Uuid) -> JoinRequestResult<()>;

    /// Attempt failed; schedule the next one
    async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> JoinRequestResult<()>;

    /// Attempt failed and no more will be made
    async fn mark_abandoned(&self, id: Uuid, error: &str) -> JoinRequestResult<()>;
}
