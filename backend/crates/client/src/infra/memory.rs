//! In-memory session store

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::session::Session;
use crate::domain::store::SessionStore;
use crate::error::ClientResult;

#[derive(Debug, Default)]
struct Slots {
    session: Option<Session>,
    profile: Option<Value>,
}

/// Process-local session store; clones share state
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slots: Arc<RwLock<Slots>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session
    pub fn with_session(session: Session) -> Self {
        Self {
            slots: Arc::new(RwLock::new(Slots {
                session: Some(session),
                profile: None,
            })),
        }
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self.slots.read().await.session.clone())
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        self.slots.write().await.session = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        let mut slots = self.slots.write().await;
        slots.session = None;
        slots.profile = None;
        Ok(())
    }

    async fn load_profile(&self) -> ClientResult<Option<Value>> {
        Ok(self.slots.read().await.profile.clone())
    }

    async fn save_profile(&self, profile: &Value) -> ClientResult<()> {
        self.slots.write().await.profile = Some(profile.clone());
        Ok(())
    }
}
