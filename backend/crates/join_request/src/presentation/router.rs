//! Join Request Router

use axum::{Router, routing::post};
use proxy::domain::upstream::UpstreamApi;
use std::sync::Arc;

use crate::domain::repository::MembershipOutbox;
use crate::presentation::handlers::{self, JoinRequestState};

/// Create the join-request decision router.
///
/// The outbox is shared with the [`crate::ReconcileWorker`].
pub fn join_request_router<U, O>(upstream: Arc<U>, outbox: Arc<O>) -> Router
where
    U: UpstreamApi + Send + Sync + 'static,
    O: MembershipOutbox + Send + Sync + 'static,
{
    let state = JoinRequestState { upstream, outbox };

    Router::new()
        .route(
            "/community-join-request/{id}/approve",
            post(handlers::approve::<U, O>),
        )
        .route(
            "/community-join-request/{id}/reject",
            post(handlers::reject::<U, O>),
        )
        .with_state(state)
}
