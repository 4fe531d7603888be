//! Block record (directed block relationships between users).

use chrono::{DateTime, Utc};
use dexsocial_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Build the id for a directed block: `{blocker}__{blocked}`, unsorted.
/// Two users blocking each other produce two independent rows.
#[must_use]
pub fn build_block_id(blocker_user_id: &str, blocked_user_id: &str) -> String {
    format!("{blocker_user_id}__{blocked_user_id}")
}

/// A directed block row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialBlockRecord {
    /// `{blocker}__{blocked}` composite key.
    pub id: String,

    /// The user who is blocking.
    pub blocker_user_id: String,

    /// The user being blocked.
    pub blocked_user_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialBlockRecord {
    /// Create a fresh block row.
    #[must_use]
    pub fn new(blocker_user_id: &str, blocked_user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: build_block_id(blocker_user_id, blocked_user_id),
            blocker_user_id: blocker_user_id.to_string(),
            blocked_user_id: blocked_user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Structural invariants, checked at the store boundary.
    pub fn validate(&self) -> AppResult<()> {
        if self.blocker_user_id == self.blocked_user_id {
            return Err(AppError::Storage(format!(
                "Block {} relates a user to itself",
                self.id
            )));
        }
        if self.id != build_block_id(&self.blocker_user_id, &self.blocked_user_id) {
            return Err(AppError::Storage(format!(
                "Block {} id does not match its pair",
                self.id
            )));
        }
        Ok(())
    }
}

/// Both directions of the block relationship between a viewer and a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockRelation {
    /// Viewer has blocked the target.
    pub viewer_blocked_target: bool,
    /// Target has blocked the viewer.
    pub target_blocked_viewer: bool,
}

impl BlockRelation {
    /// Whether a block exists in either direction.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.viewer_blocked_target || self.target_blocked_viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_is_directed() {
        assert_eq!(build_block_id("alice", "bob"), "alice__bob");
        assert_eq!(build_block_id("bob", "alice"), "bob__alice");
        assert_ne!(
            build_block_id("alice", "bob"),
            build_block_id("bob", "alice")
        );
    }

    #[test]
    fn test_validate_rejects_self_block() {
        let record = SocialBlockRecord::new("alice", "alice", Utc::now());
        assert!(record.validate().is_err());
    }
}
