//! Proxy Router
//!
//! Browser paths mirror upstream paths; the binary nests this router under
//! `/api`. Join-request approve/reject live in the `join_request` crate.

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::routing::{MethodFilter, MethodRouter, get, on, post};
use axum::Router;
use std::sync::Arc;

use crate::application::config::ProxyConfig;
use crate::domain::route::{self, RouteMessages};
use crate::domain::upstream::UpstreamApi;
use crate::presentation::handlers::{self, ProxyState};

/// Create the proxy router for any upstream implementation
pub fn proxy_router<U>(upstream: U, config: ProxyConfig) -> Router
where
    U: UpstreamApi + Clone + Send + Sync + 'static,
{
    let state = ProxyState {
        upstream: Arc::new(upstream),
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/community-category",
            forward::<U>(MethodFilter::GET, &route::CATEGORY_LIST)
                .merge(forward::<U>(MethodFilter::POST, &route::CATEGORY_CREATE)),
        )
        .route(
            "/community",
            forward::<U>(MethodFilter::GET, &route::COMMUNITY_LIST)
                .merge(forward::<U>(MethodFilter::POST, &route::COMMUNITY_CREATE)),
        )
        .route(
            "/community/{id}",
            forward::<U>(MethodFilter::GET, &route::COMMUNITY_GET)
                .merge(forward::<U>(MethodFilter::PUT, &route::COMMUNITY_UPDATE))
                .merge(forward::<U>(MethodFilter::DELETE, &route::COMMUNITY_DELETE)),
        )
        .route(
            "/community-post",
            forward::<U>(MethodFilter::GET, &route::POST_LIST)
                .merge(forward::<U>(MethodFilter::POST, &route::POST_CREATE)),
        )
        .route(
            "/community-post/{id}",
            forward::<U>(MethodFilter::GET, &route::POST_GET)
                .merge(forward::<U>(MethodFilter::PUT, &route::POST_UPDATE))
                .merge(forward::<U>(MethodFilter::DELETE, &route::POST_DELETE)),
        )
        .route(
            "/community-join-request",
            forward::<U>(MethodFilter::GET, &route::JOIN_REQUEST_LIST)
                .merge(forward::<U>(MethodFilter::POST, &route::JOIN_REQUEST_SUBMIT)),
        )
        .route(
            "/community-join-request/{id}",
            forward::<U>(MethodFilter::GET, &route::JOIN_REQUEST_GET),
        )
        .route(
            "/datasets/upload",
            post(handlers::upload_dataset::<U>).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/auth/login",
            forward::<U>(MethodFilter::POST, &route::AUTH_LOGIN),
        )
        .route(
            "/auth/refresh",
            forward::<U>(MethodFilter::POST, &route::AUTH_REFRESH),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Plain forwarding route with the given wording
fn forward<U>(
    filter: MethodFilter,
    messages: &'static RouteMessages,
) -> MethodRouter<ProxyState<U>>
where
    U: UpstreamApi + Clone + Send + Sync + 'static,
{
    on(
        filter,
        move |State(state): State<ProxyState<U>>, request: Request| async move {
            handlers::forward(state, messages, request).await
        },
    )
}
