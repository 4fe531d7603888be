//! Privacy settings repository.

use std::sync::Arc;

use chrono::Utc;
use dexsocial_common::AppResult;
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::records::{FriendRequestPolicy, PresenceVisibility, SocialPrivacySettingsRecord};
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_privacy_settings";

/// Privacy settings repository: one policy row per user, defaulted when
/// absent.
#[derive(Clone)]
pub struct PrivacySettingsRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
}

impl PrivacySettingsRepository {
    /// Create a new privacy settings repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    /// The stored record, or a constructed default. The default is not
    /// persisted until the first upsert.
    pub async fn get(&self, user_id: &str) -> AppResult<SocialPrivacySettingsRecord> {
        let rows = self.store.read_array(STORE_KEY).await?;
        let records: Vec<SocialPrivacySettingsRecord> = decode_rows(STORE_KEY, rows)?;
        Ok(records
            .into_iter()
            .find(|r| r.user_id == user_id)
            .unwrap_or_else(|| SocialPrivacySettingsRecord::default_for(user_id, Utc::now())))
    }

    /// Full-replace upsert of a user's policy, bumping `updated_at`.
    pub async fn upsert(
        &self,
        user_id: &str,
        friend_request_policy: FriendRequestPolicy,
        presence_visibility: PresenceVisibility,
    ) -> AppResult<SocialPrivacySettingsRecord> {
        let _guard = self.write_guard.lock().await;
        let rows = self.store.read_array(STORE_KEY).await?;
        let mut records: Vec<SocialPrivacySettingsRecord> = decode_rows(STORE_KEY, rows)?;

        let record = SocialPrivacySettingsRecord {
            user_id: user_id.to_string(),
            friend_request_policy,
            presence_visibility,
            updated_at: Utc::now(),
        };

        if let Some(pos) = records.iter().position(|r| r.user_id == user_id) {
            records[pos] = record.clone();
        } else {
            records.push(record.clone());
        }

        let rows = encode_rows(STORE_KEY, &records)?;
        self.store.write_array(STORE_KEY, rows).await?;
        Ok(record)
    }
}
