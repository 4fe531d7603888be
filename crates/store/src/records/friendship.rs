//! Friendship record (pairwise relationship between users).

use chrono::{DateTime, Utc};
use dexsocial_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Build the canonical id for an unordered user pair.
///
/// The two ids are sorted lexicographically and joined with `__`, so
/// exactly one record can exist per pair regardless of argument order.
#[must_use]
pub fn build_friendship_id(user_a: &str, user_b: &str) -> String {
    let (lo, hi) = if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    format!("{lo}__{hi}")
}

/// Lifecycle state of a friendship record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Requested, awaiting the other party.
    Pending,
    /// Mutual friendship.
    Accepted,
}

/// The single canonical row for an unordered user pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipRecord {
    /// `{lower}__{higher}` composite key, see [`build_friendship_id`].
    pub id: String,

    /// Lexicographically lower user of the pair.
    pub user_a_id: String,

    /// Lexicographically higher user of the pair.
    pub user_b_id: String,

    /// Which of the pair initiated the request. Only meaningful while
    /// `status` is pending.
    pub requested_by: String,

    pub status: FriendshipStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Set on the transition to accepted.
    pub accepted_at: Option<DateTime<Utc>>,
}

impl FriendshipRecord {
    /// Create a fresh pending record for a pair.
    #[must_use]
    pub fn new_pending(requester: &str, target: &str, now: DateTime<Utc>) -> Self {
        let (user_a_id, user_b_id) = if requester <= target {
            (requester.to_string(), target.to_string())
        } else {
            (target.to_string(), requester.to_string())
        };
        Self {
            id: build_friendship_id(requester, target),
            user_a_id,
            user_b_id,
            requested_by: requester.to_string(),
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
            accepted_at: None,
        }
    }

    /// Whether `user_id` is one of the pair.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// The other party of the pair, if `user_id` is a party at all.
    #[must_use]
    pub fn other_party(&self, user_id: &str) -> Option<&str> {
        if self.user_a_id == user_id {
            Some(&self.user_b_id)
        } else if self.user_b_id == user_id {
            Some(&self.user_a_id)
        } else {
            None
        }
    }

    /// Pending and addressed to `user_id` (they may accept or reject).
    #[must_use]
    pub fn is_incoming_pending(&self, user_id: &str) -> bool {
        self.status == FriendshipStatus::Pending
            && self.involves(user_id)
            && self.requested_by != user_id
    }

    /// Pending and initiated by `user_id` (they may cancel).
    #[must_use]
    pub fn is_outgoing_pending(&self, user_id: &str) -> bool {
        self.status == FriendshipStatus::Pending && self.requested_by == user_id
    }

    /// Structural invariants, checked at the store boundary.
    pub fn validate(&self) -> AppResult<()> {
        if self.user_a_id == self.user_b_id {
            return Err(AppError::Storage(format!(
                "Friendship {} relates a user to itself",
                self.id
            )));
        }
        if self.user_a_id > self.user_b_id {
            return Err(AppError::Storage(format!(
                "Friendship {} pair is not in sorted order",
                self.id
            )));
        }
        if self.id != build_friendship_id(&self.user_a_id, &self.user_b_id) {
            return Err(AppError::Storage(format!(
                "Friendship {} id does not match its pair",
                self.id
            )));
        }
        if !self.involves(&self.requested_by) {
            return Err(AppError::Storage(format!(
                "Friendship {} requested by a non-party",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_friendship_id_is_order_independent() {
        assert_eq!(build_friendship_id("alice", "bob"), "alice__bob");
        assert_eq!(build_friendship_id("bob", "alice"), "alice__bob");
        assert_eq!(
            build_friendship_id("u1", "u2"),
            build_friendship_id("u2", "u1")
        );
    }

    #[test]
    fn test_new_pending_sorts_pair_and_keeps_requester() {
        let record = FriendshipRecord::new_pending("zoe", "adam", Utc::now());
        assert_eq!(record.user_a_id, "adam");
        assert_eq!(record.user_b_id, "zoe");
        assert_eq!(record.requested_by, "zoe");
        assert_eq!(record.id, "adam__zoe");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_role_predicates() {
        let record = FriendshipRecord::new_pending("alice", "bob", Utc::now());
        assert!(record.is_outgoing_pending("alice"));
        assert!(!record.is_outgoing_pending("bob"));
        assert!(record.is_incoming_pending("bob"));
        assert!(!record.is_incoming_pending("alice"));
        assert!(!record.is_incoming_pending("carol"));
        assert_eq!(record.other_party("alice"), Some("bob"));
        assert_eq!(record.other_party("carol"), None);
    }

    #[test]
    fn test_validate_rejects_mismatched_id() {
        let mut record = FriendshipRecord::new_pending("alice", "bob", Utc::now());
        record.id = "alice__carol".to_string();
        assert!(record.validate().is_err());
    }
}
