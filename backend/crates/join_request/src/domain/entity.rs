//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::{CommunityId, JoinRequestId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Join request lifecycle, owned by upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Requesting user as embedded in the join request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequestUser {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Join request detail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub user_id: UserId,
    pub community_id: CommunityId,
    #[serde(default)]
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<JoinRequestUser>,
}

/// Who to add to which community
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipTarget {
    pub user_id: UserId,
    pub community_id: CommunityId,
}

impl MembershipTarget {
    /// Read both ids from a detail response.
    ///
    /// The record may be wrapped in a `data` envelope. `user_id` falls back
    /// to the embedded `user.id`. Returns `None` unless both ids are present
    /// and valid.
    pub fn from_detail(body: &Value) -> Option<Self> {
        let record = match body.get("data") {
            Some(data) if data.is_object() => data,
            _ => body,
        };

        let user_id = record
            .get("user_id")
            .or_else(|| record.get("user").and_then(|u| u.get("id")))
            .and_then(id_text)?;
        let community_id = record.get("community_id").and_then(id_text)?;

        Some(Self {
            user_id: UserId::new(user_id).ok()?,
            community_id: CommunityId::new(community_id).ok()?,
        })
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Outbox entry state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Done,
    Abandoned,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Done => "done",
            OutboxStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(OutboxStatus::Pending),
            "done" => Some(OutboxStatus::Done),
            "abandoned" => Some(OutboxStatus::Abandoned),
            _ => None,
        }
    }
}

/// Membership addition still owed to upstream
///
/// `target` is `None` when the detail lookup failed at approval time; the
/// worker resolves it again before adding the member.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMembership {
    pub id: Uuid,
    pub join_request_id: JoinRequestId,
    pub target: Option<MembershipTarget>,
    pub status: OutboxStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PendingMembership {
    /// New entry, due immediately
    pub fn new(
        join_request_id: JoinRequestId,
        target: Option<MembershipTarget>,
        last_error: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            join_request_id,
            target,
            status: OutboxStatus::Pending,
            // The inline attempt already failed once
            attempts: 1,
            last_error: Some(last_error.into()),
            next_attempt_at: now,
            created_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == OutboxStatus::Pending && self.next_attempt_at <= now
    }
}
