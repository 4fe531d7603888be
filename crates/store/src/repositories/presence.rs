//! Presence repository.

use std::sync::Arc;

use chrono::Utc;
use dexsocial_common::AppResult;
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::records::SocialPresenceRecord;
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_presence";

/// Presence repository: one heartbeat row per user.
///
/// Online/offline classification lives in the service layer; this only
/// stores the raw timestamps.
#[derive(Clone)]
pub struct PresenceRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
}

impl PresenceRepository {
    /// Create a new presence repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Record a heartbeat for a user. Idempotent upsert of the current
    /// timestamp.
    pub async fn touch(&self, user_id: &str) -> AppResult<SocialPresenceRecord> {
        let _guard = self.write_guard.lock().await;
        let rows = self.store.read_array(STORE_KEY).await?;
        let mut records: Vec<SocialPresenceRecord> = decode_rows(STORE_KEY, rows)?;
        let now = Utc::now();

        let record = if let Some(pos) = records.iter().position(|r| r.user_id == user_id) {
            records[pos].last_active_at = now;
            records[pos].clone()
        } else {
            let record = SocialPresenceRecord {
                user_id: user_id.to_string(),
                last_active_at: now,
            };
            records.push(record.clone());
            record
        };

        let rows = encode_rows(STORE_KEY, &records)?;
        self.store.write_array(STORE_KEY, rows).await?;
        Ok(record)
    }

    /// The heartbeat row for a user, if any.
    pub async fn get(&self, user_id: &str) -> AppResult<Option<SocialPresenceRecord>> {
        let rows = self.store.read_array(STORE_KEY).await?;
        let records: Vec<SocialPresenceRecord> = decode_rows(STORE_KEY, rows)?;
        Ok(records.into_iter().find(|r| r.user_id == user_id))
    }
}
