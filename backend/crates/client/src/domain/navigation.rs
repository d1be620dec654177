//! Sign-in navigation port
//!
//! When a refresh fails the client forces the user back to the sign-in
//! entry point. What "navigate" means depends on the host (a browser
//! location change, a UI event, a log line), so it sits behind a trait.

/// Host-provided navigation to the sign-in entry point
pub trait SignInRedirect: Send + Sync {
    fn redirect_to_sign_in(&self, location: &str);
}
