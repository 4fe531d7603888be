//! Block repository.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dexsocial_common::{AppError, AppResult};
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::records::{BlockRelation, SocialBlockRecord, build_block_id};
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_blocks";

/// Block repository for document store operations.
#[derive(Clone)]
pub struct BlockRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
}

impl BlockRepository {
    /// Create a new block repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    async fn read_all(&self) -> AppResult<Vec<SocialBlockRecord>> {
        let rows = self.store.read_array(STORE_KEY).await?;
        let records: Vec<SocialBlockRecord> = decode_rows(STORE_KEY, rows)?;
        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }

    async fn write_all(&self, records: &[SocialBlockRecord]) -> AppResult<()> {
        let rows = encode_rows(STORE_KEY, records)?;
        self.store.write_array(STORE_KEY, rows).await
    }

    /// Both directions of the block relationship between viewer and target.
    pub async fn get_relation(&self, viewer: &str, target: &str) -> AppResult<BlockRelation> {
        let records = self.read_all().await?;
        let forward = build_block_id(viewer, target);
        let reverse = build_block_id(target, viewer);
        Ok(BlockRelation {
            viewer_blocked_target: records.iter().any(|r| r.id == forward),
            target_blocked_viewer: records.iter().any(|r| r.id == reverse),
        })
    }

    /// Ids involved in a block with the viewer in either direction. Used
    /// to hide users from search results and feeds.
    pub async fn list_blocked_ids_for_viewer(&self, user_id: &str) -> AppResult<HashSet<String>> {
        let records = self.read_all().await?;
        let mut ids = HashSet::new();
        for record in records {
            if record.blocker_user_id == user_id {
                ids.insert(record.blocked_user_id);
            } else if record.blocked_user_id == user_id {
                ids.insert(record.blocker_user_id);
            }
        }
        Ok(ids)
    }

    /// Rows where `user_id` is the blocker.
    pub async fn list_blocked_by_blocker(&self, user_id: &str) -> AppResult<Vec<SocialBlockRecord>> {
        let records = self.read_all().await?;
        Ok(records
            .into_iter()
            .filter(|r| r.blocker_user_id == user_id)
            .collect())
    }

    /// Block a user. Idempotent upsert: an existing row only gets its
    /// `updated_at` bumped.
    pub async fn block(&self, blocker: &str, blocked: &str) -> AppResult<SocialBlockRecord> {
        if blocker == blocked {
            return Err(AppError::BadRequest("Cannot block yourself".to_string()));
        }

        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let id = build_block_id(blocker, blocked);
        let now = Utc::now();

        let record = if let Some(pos) = records.iter().position(|r| r.id == id) {
            records[pos].updated_at = now;
            records[pos].clone()
        } else {
            let record = SocialBlockRecord::new(blocker, blocked, now);
            records.push(record.clone());
            record
        };

        self.write_all(&records).await?;
        Ok(record)
    }

    /// Unblock a user.
    pub async fn unblock(&self, blocker: &str, blocked: &str) -> AppResult<()> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let id = build_block_id(blocker, blocked);

        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(AppError::NotFound("Not blocking this user".to_string()));
        };
        records.remove(pos);
        self.write_all(&records).await
    }
}
