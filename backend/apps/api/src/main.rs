//! Gateway Entry Point
//!
//! Loads configuration, picks the membership outbox backend, starts the
//! reconcile worker and serves the `/api` routes.
//! Uses `anyhow` for startup errors; request-level errors are the
//! per-crate error types.

use axum::{
    Router,
    http::{self, Method, header},
};
use join_request::{
    InMemoryOutbox, JoinRequestConfig, MembershipOutbox, PgMembershipOutbox, ReconcileWorker,
    join_request_router,
};
use platform::config::{env_opt, env_or, split_list};
use platform::upstream::UpstreamClient;
use proxy::{HttpUpstream, ProxyConfig, proxy_router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,proxy=info,join_request=info,client=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let proxy_config = ProxyConfig::from_env()?;

    // Outbox configuration (fast retries in development)
    let join_request_config = if cfg!(debug_assertions) {
        JoinRequestConfig::development()
    } else {
        JoinRequestConfig::default()
    }
    .with_env_overrides()?;

    let client = UpstreamClient::new(
        &proxy_config.upstream_base_url,
        proxy_config.upstream_timeout,
    )?;
    let upstream = HttpUpstream::new(client);

    tracing::info!(
        upstream = %proxy_config.upstream_base_url,
        max_upload_bytes = proxy_config.max_upload_bytes,
        "Upstream configured"
    );

    // Outbox storage: PostgreSQL when configured, otherwise process memory
    let api = match env_opt("DATABASE_URL") {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let outbox = PgMembershipOutbox::new(pool);
            match outbox.purge_done(join_request_config.done_retention).await {
                Ok(deleted) => {
                    tracing::info!(entries_deleted = deleted, "Outbox cleanup completed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Outbox cleanup failed, continuing anyway");
                }
            }

            routes(upstream, proxy_config, outbox, join_request_config)
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; queued memberships are lost on restart"
            );
            routes(
                upstream,
                proxy_config,
                InMemoryOutbox::new(),
                join_request_config,
            )
        }
    };

    // CORS configuration
    let frontend_origins = env_or(
        "FRONTEND_ORIGINS",
        "http://localhost:40922,http://127.0.0.1:40922",
    );

    let allowed_origins: Vec<http::HeaderValue> = split_list(&frontend_origins)
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_or("GATEWAY_BIND_ADDR", "0.0.0.0:31113").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Compose the gateway routes and start the reconcile worker for `outbox`
fn routes<O>(
    upstream: HttpUpstream,
    proxy_config: ProxyConfig,
    outbox: O,
    config: JoinRequestConfig,
) -> Router
where
    O: MembershipOutbox + Send + Sync + 'static,
{
    let shared_upstream = Arc::new(upstream.clone());
    let outbox = Arc::new(outbox);
    let poll_interval = config.poll_interval;

    if config.service_token.is_some() {
        ReconcileWorker::new(shared_upstream.clone(), outbox.clone(), Arc::new(config))
            .spawn(poll_interval);
        tracing::info!(poll_interval_secs = poll_interval.as_secs(), "Reconcile worker started");
    } else {
        tracing::warn!("OUTBOX_SERVICE_TOKEN not set; queued memberships are not retried");
    }

    proxy_router(upstream, proxy_config).merge(join_request_router(shared_upstream, outbox))
}
