//! Presence service.
//!
//! The repository only stores raw heartbeat timestamps; everything a
//! viewer actually sees (online / offline / hidden) is derived here, per
//! viewer, at request time.

use chrono::{Duration, Utc};
use dexsocial_common::AppResult;
use dexsocial_store::records::{FriendshipStatus, PresenceVisibility, SocialPresenceRecord};
use dexsocial_store::repositories::{
    BlockRepository, FriendshipRepository, PresenceRepository, PrivacySettingsRepository,
};

use crate::views::{PresenceState, PresenceView};

/// A user is online if their last heartbeat is within this window.
const ONLINE_WINDOW_SECS: i64 = 120;

/// Presence service for per-viewer visibility derivation.
#[derive(Clone)]
pub struct PresenceService {
    presence_repo: PresenceRepository,
    privacy_repo: PrivacySettingsRepository,
    friendship_repo: FriendshipRepository,
    block_repo: BlockRepository,
}

impl PresenceService {
    /// Create a new presence service.
    #[must_use]
    pub const fn new(
        presence_repo: PresenceRepository,
        privacy_repo: PrivacySettingsRepository,
        friendship_repo: FriendshipRepository,
        block_repo: BlockRepository,
    ) -> Self {
        Self {
            presence_repo,
            privacy_repo,
            friendship_repo,
            block_repo,
        }
    }

    /// Record a heartbeat for a user.
    pub async fn touch(&self, user_id: &str) -> AppResult<SocialPresenceRecord> {
        self.presence_repo.touch(user_id).await
    }

    /// Presence of `target` as seen by `viewer`.
    ///
    /// Precedence: self sees their raw state; a block in either direction
    /// hides the state; otherwise the target's `presence_visibility`
    /// policy decides. `hidden` keeps the raw timestamp in the view; it
    /// labels the state, it does not redact the field.
    pub async fn resolve_for_viewer(&self, viewer: &str, target: &str) -> AppResult<PresenceView> {
        let record = self.presence_repo.get(target).await?;
        let last_active_at = record.map(|r| r.last_active_at);

        if viewer == target {
            return Ok(PresenceView {
                state: classify(last_active_at),
                last_active_at,
            });
        }

        let hidden = PresenceView {
            state: PresenceState::Hidden,
            last_active_at,
        };

        let blocks = self.block_repo.get_relation(viewer, target).await?;
        if blocks.any() {
            return Ok(hidden);
        }

        let settings = self.privacy_repo.get(target).await?;
        match settings.presence_visibility {
            PresenceVisibility::NoOne => Ok(hidden),
            PresenceVisibility::Friends => {
                let friendship = self.friendship_repo.get_between(viewer, target).await?;
                let accepted = friendship
                    .is_some_and(|f| f.status == FriendshipStatus::Accepted);
                if accepted {
                    Ok(PresenceView {
                        state: classify(last_active_at),
                        last_active_at,
                    })
                } else {
                    Ok(hidden)
                }
            }
            PresenceVisibility::Everyone => Ok(PresenceView {
                state: classify(last_active_at),
                last_active_at,
            }),
        }
    }
}

/// Raw online/offline classification of a heartbeat.
fn classify(last_active_at: Option<chrono::DateTime<Utc>>) -> PresenceState {
    match last_active_at {
        Some(ts) if Utc::now() - ts <= Duration::seconds(ONLINE_WINDOW_SECS) => {
            PresenceState::Online
        }
        _ => PresenceState::Offline,
    }
}
