//! Session Store Trait
//!
//! Persistence port for the single session. Implementations live in the
//! infrastructure layer.

use serde_json::Value;

use crate::domain::session::Session;
use crate::error::ClientResult;

/// Fixed storage keys
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_PROFILE_KEY: &str = "user";

/// Session store trait
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Current session; `None` unless both tokens are present
    async fn load(&self) -> ClientResult<Option<Session>>;

    /// Replace both tokens
    async fn save(&self, session: &Session) -> ClientResult<()>;

    /// Remove both tokens and the cached profile
    async fn clear(&self) -> ClientResult<()>;

    /// Cached user profile
    async fn load_profile(&self) -> ClientResult<Option<Value>>;

    /// Replace the cached user profile
    async fn save_profile(&self, profile: &Value) -> ClientResult<()>;
}
