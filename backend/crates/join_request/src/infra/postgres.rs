//! PostgreSQL outbox

use chrono::{DateTime, Utc};
use kernel::id::{CommunityId, JoinRequestId, UserId};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entity::{MembershipTarget, OutboxStatus, PendingMembership};
use crate::domain::repository::MembershipOutbox;
use crate::error::{JoinRequestError, JoinRequestResult};

/// PostgreSQL-backed outbox (`membership_outbox` table)
#[derive(Clone)]
pub struct PgMembershipOutbox {
    pool: PgPool,
}

impl PgMembershipOutbox {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete reconciled entries last touched more than `older_than` ago
    pub async fn purge_done(&self, older_than: Duration) -> JoinRequestResult<u64> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(older_than).unwrap_or_else(|_| chrono::Duration::zero());
        let deleted = sqlx::query(
            "DELETE FROM membership_outbox WHERE status = 'done' AND updated_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deleted > 0 {
            tracing::info!(deleted, "Purged reconciled outbox entries");
        }
        Ok(deleted)
    }
}

impl MembershipOutbox for PgMembershipOutbox {
    async fn enqueue(&self, entry: &PendingMembership) -> JoinRequestResult<()> {
        let mut tx = self.pool.begin().await?;

        // Only one open entry per join request
        sqlx::query(
            "DELETE FROM membership_outbox WHERE join_request_id = $1 AND status = 'pending'",
        )
        .bind(entry.join_request_id.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO membership_outbox (
                membership_outbox_id,
                join_request_id,
                user_id,
                community_id,
                status,
                attempts,
                last_error,
                next_attempt_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id)
        .bind(entry.join_request_id.as_str())
        .bind(entry.target.as_ref().map(|t| t.user_id.as_str()))
        .bind(entry.target.as_ref().map(|t| t.community_id.as_str()))
        .bind(entry.status.as_str())
        .bind(entry.attempts as i32)
        .bind(entry.last_error.as_deref())
        .bind(entry.next_attempt_at)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(entry_id = %entry.id, "Outbox entry stored");
        Ok(())
    }

    async fn due(&self, now: DateTime<Utc>, limit: usize) -> JoinRequestResult<Vec<PendingMembership>> {
        let rows = sqlx::query_as::<_, OutboxRow>(
            r#"
            SELECT
                membership_outbox_id,
                join_request_id,
                user_id,
                community_id,
                status,
                attempts,
                last_error,
                next_attempt_at,
                created_at
            FROM membership_outbox
            WHERE status = 'pending' AND next_attempt_at <= $1
            ORDER BY next_attempt_at
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OutboxRow::into_entry).collect()
    }

    async fn mark_done(&self, id: Uuid) -> JoinRequestResult<()> {
        sqlx::query(
            r#"
            UPDATE membership_outbox
            SET status = 'done', last_error = NULL, updated_at = now()
            WHERE membership_outbox_id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> JoinRequestResult<()> {
        sqlx::query(
            r#"
            UPDATE membership_outbox
            SET attempts = attempts + 1,
                last_error = $2,
                next_attempt_at = $3,
                updated_at = now()
            WHERE membership_outbox_id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_abandoned(&self, id: Uuid, error: &str) -> JoinRequestResult<()> {
        sqlx::query(
            r#"
            UPDATE membership_outbox
            SET status = 'abandoned',
                attempts = attempts + 1,
                last_error = $2,
                updated_at = now()
            WHERE membership_outbox_id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// Database row types

#[derive(sqlx::FromRow)]
struct OutboxRow {
    membership_outbox_id: Uuid,
    join_request_id: String,
    user_id: Option<String>,
    community_id: Option<String>,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    next_attempt_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl OutboxRow {
    fn into_entry(self) -> JoinRequestResult<PendingMembership> {
        let corrupt = |what: &str| {
            JoinRequestError::CorruptEntry(format!("{}: {what}", self.membership_outbox_id))
        };

        let status = OutboxStatus::parse(&self.status).ok_or_else(|| corrupt("status"))?;
        let join_request_id =
            JoinRequestId::new(&self.join_request_id).map_err(|_| corrupt("join_request_id"))?;

        let target = match (&self.user_id, &self.community_id) {
            (Some(user_id), Some(community_id)) => Some(MembershipTarget {
                user_id: UserId::new(user_id).map_err(|_| corrupt("user_id"))?,
                community_id: CommunityId::new(community_id).map_err(|_| corrupt("community_id"))?,
            }),
            _ => None,
        };

        Ok(PendingMembership {
            id: self.membership_outbox_id,
            join_request_id,
            target,
            status,
            attempts: self.attempts.max(0) as u32,
            last_error: self.last_error,
            next_attempt_at: self.next_attempt_at,
            created_at: self.created_at,
        })
    }
}
