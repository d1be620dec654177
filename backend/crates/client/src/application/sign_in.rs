//! Sign In / Sign Out Use Cases
//!
//! Sign-in is the only call that creates a session from nothing, so it
//! bypasses the refresh-and-retry path entirely.

use http::{Method, header};
use serde::Serialize;
use serde_json::Value;

use crate::application::send::RequestClient;
use crate::domain::session::{Session, profile_from_response};
use crate::domain::store::SessionStore;
use crate::error::{ClientError, ClientResult};

/// Login payload
#[derive(Debug, Clone, Serialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl<S> RequestClient<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    /// POST credentials, then persist the returned token pair (and the
    /// `user` profile when present). Returns the profile.
    pub async fn sign_in(&self, input: &SignInInput) -> ClientResult<Option<Value>> {
        let request = self
            .upstream
            .request(Method::POST, &self.config.login_path, None)
            .header(header::ACCEPT, "application/json")
            .json(input);

        let response = self.upstream.execute(request).await?;
        if !response.is_success() {
            tracing::info!(status = response.status, "Sign-in rejected");
            return Err(ClientError::from_response(response.status, &response.body));
        }

        let body: Value = response.json()?;
        let session = Session::from_token_response(&body).ok_or_else(|| ClientError::Http {
            status: response.status,
            message: "Sign-in response did not contain a token pair".to_string(),
            detail: Some(body.clone()),
        })?;
        let profile = profile_from_response(&body);

        self.sessions.establish(&session, profile.as_ref()).await?;
        Ok(profile)
    }

    /// Forget the session locally. No network call is made.
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.sessions.sign_out().await
    }

    /// Cached user profile, if signed in
    pub async fn profile(&self) -> ClientResult<Option<Value>> {
        self.sessions.store().load_profile().await
    }
}
