//! Presence record (heartbeat timestamps, one row per user).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last-active heartbeat for a user. No history is retained; each touch
/// overwrites the previous value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPresenceRecord {
    pub user_id: String,
    pub last_active_at: DateTime<Utc>,
}
