//! Join-Request Orchestrator
//!
//! Approving a join request is a two-phase workflow:
//! - `application/approve` - approve upstream (must succeed), then add the
//!   user to the community (best effort)
//! - `domain/` - Join request entities and the membership outbox port
//! - `application/reconcile` - Worker that repairs failed additions
//! - `infra/` - Outbox storage (PostgreSQL, in-memory)
//! - `presentation/` - Approve / reject routes
//!
//! ## Consistency Model
//! - The browser always gets the approve response, success or failure
//! - A failed approve stops the workflow; nothing else is called
//! - A failed membership addition is queued, retried with backoff, and
//!   abandoned (logged at `error`) after `max_attempts`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::approve::{ApproveJoinRequestUseCase, ApproveOutput, MembershipOutcome};
pub use application::config::JoinRequestConfig;
pub use application::reconcile::{ReconcileReport, ReconcileWorker};
pub use application::reject::RejectJoinRequestUseCase;
pub use domain::entity::{
    JoinRequest, JoinRequestStatus, MembershipTarget, OutboxStatus, PendingMembership,
};
pub use domain::repository::MembershipOutbox;
pub use error::{JoinRequestError, JoinRequestResult, MembershipStepError};
pub use infra::memory::InMemoryOutbox;
pub use infra::postgres::PgMembershipOutbox;
pub use presentation::router::join_request_router;

#[cfg(test)]
mod tests;
