//! Sign-in redirect implementations

use tokio::sync::watch;

use crate::domain::navigation::SignInRedirect;

/// Logs the redirect; for hosts without a navigation surface
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRedirect;

impl SignInRedirect for TracingRedirect {
    fn redirect_to_sign_in(&self, location: &str) {
        tracing::info!(location, "Sign-in required");
    }
}

/// Publishes the target location on a watch channel for a UI to follow
#[derive(Debug)]
pub struct WatchRedirect {
    tx: watch::Sender<Option<String>>,
}

impl WatchRedirect {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    /// Last requested location
    pub fn last(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

impl Default for WatchRedirect {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInRedirect for WatchRedirect {
    fn redirect_to_sign_in(&self, location: &str) {
        self.tx.send_replace(Some(location.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watch_redirect_notifies_subscribers() {
        let redirect = WatchRedirect::new();
        let mut rx = redirect.subscribe();

        redirect.redirect_to_sign_in("/sign-in");

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("/sign-in"));
        assert_eq!(redirect.last().as_deref(), Some("/sign-in"));
    }
}
