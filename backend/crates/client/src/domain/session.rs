//! Session Entity
//!
//! The access/refresh credential pair of the signed-in user. Exactly one
//! session exists per store; it is replaced wholesale on sign-in or refresh
//! and cleared on sign-out or refresh failure.

use serde_json::Value;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Short-lived bearer credential
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

/// Long-lived credential exchanged for a new pair
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RefreshToken(String);

macro_rules! token_impls {
    ($ty:ident) => {
        impl $ty {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($ty), "(***)"))
            }
        }
    };
}

token_impls!(AccessToken);
token_impls!(RefreshToken);

/// Signed-in credential pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: AccessToken::new(access_token),
            refresh_token: RefreshToken::new(refresh_token),
        }
    }

    /// Read a token pair out of an auth endpoint response.
    ///
    /// The pair may sit at the top level or inside a `data` envelope. Both
    /// tokens must be non-empty strings; a partial pair yields `None`.
    pub fn from_token_response(body: &Value) -> Option<Self> {
        token_payloads(body).find_map(|payload| {
            let access = non_empty(payload.get("access_token"))?;
            let refresh = non_empty(payload.get("refresh_token"))?;
            Some(Session::new(access, refresh))
        })
    }
}

/// User profile cached next to the session, if the auth response had one
pub fn profile_from_response(body: &Value) -> Option<Value> {
    token_payloads(body)
        .find_map(|payload| payload.get("user").filter(|u| u.is_object()).cloned())
}

fn token_payloads(body: &Value) -> impl Iterator<Item = &Value> {
    body.get("data")
        .filter(|d| d.is_object())
        .into_iter()
        .chain(std::iter::once(body))
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_pair_at_top_level() {
        let session = Session::from_token_response(&json!({
            "access_token": "a1",
            "refresh_token": "r1"
        }))
        .unwrap();
        assert_eq!(session.access_token.as_str(), "a1");
        assert_eq!(session.refresh_token.as_str(), "r1");
    }

    #[test]
    fn test_token_pair_inside_data_envelope() {
        let session = Session::from_token_response(&json!({
            "status": true,
            "message": "Token refreshed",
            "data": { "access_token": "a2", "refresh_token": "r2" }
        }))
        .unwrap();
        assert_eq!(session.access_token.as_str(), "a2");
    }

    #[test]
    fn test_partial_pair_is_rejected() {
        assert!(Session::from_token_response(&json!({ "access_token": "a" })).is_none());
        assert!(
            Session::from_token_response(&json!({
                "data": { "access_token": "a", "refresh_token": "" }
            }))
            .is_none()
        );
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = Session::new("secret-access", "secret-refresh");
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("AccessToken(***)"));
    }

    #[test]
    fn test_profile_lookup() {
        let body = json!({ "data": { "user": { "id": "U1", "email": "a@b.c" } } });
        assert_eq!(profile_from_response(&body).unwrap()["id"], "U1");
        assert!(profile_from_response(&json!({ "user": "nope" })).is_none());
    }
}
