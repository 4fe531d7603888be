//! Activity record (append-only feed source).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::Chronological;

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    FriendRequestSent,
    FriendRequestAccepted,
    FriendRemoved,
    FavoriteAdded,
}

/// Descriptor of a favorited reference-data entity (item, map, explorer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRef {
    pub entity_type: String,
    pub entity_id: String,
    pub title: String,
    pub href: String,
}

/// One row of the activity log. Rows older than the retention window are
/// pruned on every write, and the log is hard-capped (oldest dropped
/// first).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialActivityRecord {
    pub id: String,
    pub kind: ActivityKind,
    pub actor_user_id: String,
    pub target_user_id: Option<String>,
    pub favorite: Option<FavoriteRef>,
    pub created_at: DateTime<Utc>,
}

impl Chronological for SocialActivityRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn sort_id(&self) -> &str {
        &self.id
    }
}
