//! In-memory outbox
//!
//! Used when no database is configured. Entries do not survive a restart,
//! and finished entries are dropped instead of kept for audit.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::{OutboxStatus, PendingMembership};
use crate::domain::repository::MembershipOutbox;
use crate::error::{JoinRequestError, JoinRequestResult};

/// Process-local outbox; clones share state
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutbox {
    entries: Arc<Mutex<HashMap<Uuid, PendingMembership>>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry, oldest first
    pub async fn entries(&self) -> Vec<PendingMembership> {
        let mut all: Vec<_> = self.entries.lock().await.values().cloned().collect();
        all.sort_by_key(|e| e.created_at);
        all
    }

    async fn remove(&self, id: Uuid) -> JoinRequestResult<()> {
        self.entries
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| JoinRequestError::CorruptEntry(format!("unknown outbox entry {id}")))
    }

    async fn update(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut PendingMembership) + Send,
    ) -> JoinRequestResult<()> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| JoinRequestError::CorruptEntry(format!("unknown outbox entry {id}")))?;
        f(entry);
        Ok(())
    }
}

impl MembershipOutbox for InMemoryOutbox {
    async fn enqueue(&self, entry: &PendingMembership) -> JoinRequestResult<()> {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| {
            !(e.join_request_id == entry.join_request_id && e.status == OutboxStatus::Pending)
        });
        entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn due(&self, now: DateTime<Utc>, limit: usize) -> JoinRequestResult<Vec<PendingMembership>> {
        let mut due: Vec<_> = self
            .entries
            .lock()
            .await
            .values()
            .filter(|e| e.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|e| e.next_attempt_at);
        due.truncate(limit);
        Ok(due)
    }

    async fn mark_done(&self, id: Uuid) -> JoinRequestResult<()> {
        self.remove(id).await
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> JoinRequestResult<()> {
        let error = error.to_string();
        self.update(id, move |e| {
            e.attempts += 1;
            e.last_error = Some(error);
            e.next_attempt_at = next_attempt_at;
        })
        .await
    }

    async fn mark_abandoned(&self, id: Uuid, _error: &str) -> JoinRequestResult<()> {
        // The worker has already logged the final error
        self.remove(id).await
    }
}
