//! Common ID Types
//!
//! Upstream resources are identified by opaque strings. These wrappers keep
//! a join-request id from being passed where a community id is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;

/// Rejected id input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier contains a path separator: {0}")]
    PathSeparator(String),
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
/// let id: UserId = "U1".parse().unwrap();
/// assert_eq!(id.as_str(), "U1");
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Validate and wrap an id. Ids are interpolated into upstream paths, so
    /// `/` is refused.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }
        if trimmed.contains('/') {
            return Err(IdError::PathSeparator(value));
        }
        Ok(Self {
            value: trimmed.to_string(),
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// Manual impls: derives would put bounds on `T`.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

/// Accepts both JSON strings and integers; some upstream endpoints emit
/// numeric ids.
impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let text = match raw {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected string or number id, got {other}"
                )));
            }
        };
        Self::new(text).map_err(serde::de::Error::custom)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    pub struct JoinRequest;
    pub struct User;
    pub struct Community;
}

pub type JoinRequestId = Id<markers::JoinRequest>;
pub type UserId = Id<markers::User>;
pub type CommunityId = Id<markers::Community>;
