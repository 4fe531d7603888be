//! Notification record (per-recipient inbox rows).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::Chronological;

/// What the recipient is being told about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    IncomingFriendRequest,
    FriendRequestAccepted,
    FriendRemoved,
    SocialReportSubmitted,
}

/// One notification row. Retention-bounded the same way as the activity
/// log, with a longer window and a larger cap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialNotificationRecord {
    pub id: String,
    /// Recipient.
    pub user_id: String,
    pub kind: NotificationKind,
    /// Who triggered it, when a single user did.
    pub actor_user_id: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub href: Option<String>,
    /// Null while unread.
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SocialNotificationRecord {
    /// Whether the recipient has not read this yet.
    #[must_use]
    pub const fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

impl Chronological for SocialNotificationRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn sort_id(&self) -> &str {
        &self.id
    }
}
