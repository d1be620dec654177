//! Session Manager
//!
//! Owns the session for the request layer and coalesces refreshes: all
//! refresh attempts run behind one async mutex, and a caller whose rejected
//! token has already been replaced reuses the new session instead of
//! refreshing again.

use http::Method;
use platform::upstream::UpstreamClient;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::config::ClientConfig;
use crate::domain::navigation::SignInRedirect;
use crate::domain::session::{AccessToken, RefreshToken, Session};
use crate::domain::store::SessionStore;
use crate::error::ClientResult;

/// Result of asking for a fresh session after a 401
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This call performed the refresh
    Refreshed(Session),
    /// Another caller refreshed while this one waited
    Reused(Session),
    /// Nothing to refresh with
    NoSession,
    /// Refresh was attempted and failed; the session is gone
    Failed,
}

impl RefreshOutcome {
    /// Session to retry with, if any
    pub fn session(&self) -> Option<&Session> {
        match self {
            RefreshOutcome::Refreshed(s) | RefreshOutcome::Reused(s) => Some(s),
            RefreshOutcome::NoSession | RefreshOutcome::Failed => None,
        }
    }
}

/// Session manager
pub struct SessionManager<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    store: Arc<S>,
    upstream: UpstreamClient,
    redirect: Arc<dyn SignInRedirect>,
    config: Arc<ClientConfig>,
    refresh_lock: Mutex<()>,
}

impl<S> SessionManager<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<S>,
        upstream: UpstreamClient,
        redirect: Arc<dyn SignInRedirect>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            store,
            upstream,
            redirect,
            config,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Current session, waiting out any refresh in flight
    pub async fn current(&self) -> ClientResult<Option<Session>> {
        let _guard = self.refresh_lock.lock().await;
        self.store.load().await
    }

    /// Current access token, waiting out any refresh in flight
    pub async fn access_token(&self) -> ClientResult<Option<AccessToken>> {
        Ok(self.current().await?.map(|s| s.access_token.clone()))
    }

    /// Store a session obtained from sign-in
    pub async fn establish(&self, session: &Session, profile: Option<&Value>) -> ClientResult<()> {
        let _guard = self.refresh_lock.lock().await;
        self.store.save(session).await?;
        if let Some(profile) = profile {
            self.store.save_profile(profile).await?;
        }
        tracing::info!("Session established");
        Ok(())
    }

    /// Clear the session without navigating (explicit sign-out)
    pub async fn sign_out(&self) -> ClientResult<()> {
        let _guard = self.refresh_lock.lock().await;
        self.store.clear().await?;
        tracing::info!("Session cleared by sign-out");
        Ok(())
    }

    /// Obtain a session to retry with after `rejected` got a 401.
    ///
    /// `rejected` is the access token that was attached to the failed call,
    /// or `None` if the call went out unauthenticated.
    pub async fn refresh_after_rejection(
        &self,
        rejected: Option<&AccessToken>,
    ) -> ClientResult<RefreshOutcome> {
        let _guard = self.refresh_lock.lock().await;

        let Some(current) = self.store.load().await? else {
            tracing::debug!("No session to refresh");
            return Ok(RefreshOutcome::NoSession);
        };

        if rejected != Some(&current.access_token) {
            tracing::debug!("Session already refreshed by a concurrent call");
            return Ok(RefreshOutcome::Reused(current));
        }

        match self.request_refresh(&current.refresh_token).await {
            Some(session) => {
                self.store.save(&session).await?;
                tracing::info!("Access token refreshed");
                Ok(RefreshOutcome::Refreshed(session))
            }
            None => {
                self.teardown().await;
                Ok(RefreshOutcome::Failed)
            }
        }
    }

    /// POST the refresh token; `None` on any failure
    async fn request_refresh(&self, refresh_token: &RefreshToken) -> Option<Session> {
        let request = self
            .upstream
            .request(Method::POST, &self.config.refresh_path, None)
            .json(&json!({ "refresh_token": refresh_token.as_str() }));

        let response = match self.upstream.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh request failed");
                return None;
            }
        };

        if !response.is_success() {
            tracing::warn!(status = response.status, "Token refresh rejected");
            return None;
        }

        let body: Value = match response.json() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh returned a non-JSON body");
                return None;
            }
        };

        let session = Session::from_token_response(&body);
        if session.is_none() {
            tracing::warn!("Token refresh response is missing a token");
        }
        session
    }

    /// Drop the session and send the user to sign-in.
    ///
    /// Caller must hold `refresh_lock`.
    async fn teardown(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::error!(error = %e, "Failed to clear session after refresh failure");
        }
        tracing::warn!(location = %self.config.sign_in_path, "Session expired, redirecting to sign-in");
        self.redirect.redirect_to_sign_in(&self.config.sign_in_path);
    }
}
