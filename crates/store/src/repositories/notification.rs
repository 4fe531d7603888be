//! Notification log repository.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dexsocial_common::{AppError, AppResult, IdGenerator};
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::pagination::{Cursor, Page, paginate, sort_rows};
use crate::records::{NotificationKind, SocialNotificationRecord};
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_notifications";

/// Rows older than this are pruned on every write and skipped on read.
const RETENTION_DAYS: i64 = 60;

/// Hard cap on stored rows; oldest are dropped first.
const MAX_ROWS: usize = 4000;

/// Per-recipient notification inbox, retention-bounded like the activity
/// log.
#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
    id_gen: IdGenerator,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
            id_gen: IdGenerator::new(),
        }
    }

    async fn read_all(&self) -> AppResult<Vec<SocialNotificationRecord>> {
        let rows = self.store.read_array(STORE_KEY).await?;
        decode_rows(STORE_KEY, rows)
    }

    async fn write_all(&self, records: &[SocialNotificationRecord]) -> AppResult<()> {
        let rows = encode_rows(STORE_KEY, records)?;
        self.store.write_array(STORE_KEY, rows).await
    }

    fn live(records: Vec<SocialNotificationRecord>) -> Vec<SocialNotificationRecord> {
        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        records.into_iter().filter(|r| r.created_at >= cutoff).collect()
    }

    /// Append a notification, pruning expired and over-cap rows in the
    /// same write.
    pub async fn append(
        &self,
        user_id: &str,
        kind: NotificationKind,
        actor_user_id: Option<&str>,
        title: &str,
        body: Option<&str>,
        href: Option<&str>,
    ) -> AppResult<SocialNotificationRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;

        let record = SocialNotificationRecord {
            id: self.id_gen.generate(),
            user_id: user_id.to_string(),
            kind,
            actor_user_id: actor_user_id.map(ToString::to_string),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            href: href.map(ToString::to_string),
            read_at: None,
            created_at: Utc::now(),
        };
        records.push(record.clone());

        let mut records = Self::live(records);
        sort_rows(&mut records);
        records.truncate(MAX_ROWS);

        self.write_all(&records).await?;
        Ok(record)
    }

    /// Find a notification by id.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<SocialNotificationRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    /// One page of a recipient's inbox, newest first.
    pub async fn list_page_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> AppResult<Page<SocialNotificationRecord>> {
        let records = Self::live(self.read_all().await?);
        let filtered: Vec<SocialNotificationRecord> = records
            .into_iter()
            .filter(|r| r.user_id == user_id && (!unread_only || r.is_unread()))
            .collect();
        Ok(paginate(filtered, cursor, limit))
    }

    /// Count a recipient's unread notifications.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<usize> {
        let records = Self::live(self.read_all().await?);
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id && r.is_unread())
            .count())
    }

    /// Mark one notification read. Already-read rows are left as they are.
    pub async fn mark_read(&self, id: &str) -> AppResult<SocialNotificationRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;

        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(AppError::NotFound(format!("Notification not found: {id}")));
        };
        if records[pos].read_at.is_none() {
            records[pos].read_at = Some(Utc::now());
        }
        let record = records[pos].clone();
        self.write_all(&records).await?;
        Ok(record)
    }

    /// Mark all of a recipient's unread notifications read. Returns how
    /// many changed.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<usize> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let now = Utc::now();

        let mut changed = 0;
        for record in records.iter_mut().filter(|r| r.user_id == user_id) {
            if record.read_at.is_none() {
                record.read_at = Some(now);
                changed += 1;
            }
        }
        if changed > 0 {
            self.write_all(&records).await?;
        }
        Ok(changed)
    }

    /// Delete one notification.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;

        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(AppError::NotFound(format!("Notification not found: {id}")));
        };
        records.remove(pos);
        self.write_all(&records).await
    }

    /// Delete everything addressed to a recipient. Returns how many rows
    /// were removed.
    pub async fn delete_for_user(&self, user_id: &str) -> AppResult<usize> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        let removed = before - records.len();
        if removed > 0 {
            self.write_all(&records).await?;
        }
        Ok(removed)
    }
}
