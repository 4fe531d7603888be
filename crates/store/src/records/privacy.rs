//! Privacy settings record (per-user social policy).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who may send the user a friend request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestPolicy {
    #[default]
    Everyone,
    NoOne,
}

/// Who may see the user's online/offline state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceVisibility {
    Everyone,
    #[default]
    Friends,
    NoOne,
}

/// Per-user social privacy policy. Absence of a row implies the defaults;
/// a default is constructed on read but not persisted until first update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPrivacySettingsRecord {
    pub user_id: String,
    pub friend_request_policy: FriendRequestPolicy,
    pub presence_visibility: PresenceVisibility,
    pub updated_at: DateTime<Utc>,
}

impl SocialPrivacySettingsRecord {
    /// The defaulted record for a user without a stored row.
    #[must_use]
    pub fn default_for(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            friend_request_policy: FriendRequestPolicy::default(),
            presence_visibility: PresenceVisibility::default(),
            updated_at: now,
        }
    }
}
