//! Activity log repository.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dexsocial_common::{AppResult, IdGenerator};
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::pagination::{Cursor, Page, paginate, sort_rows};
use crate::records::{ActivityKind, FavoriteRef, SocialActivityRecord};
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_activity";

/// Rows older than this are pruned on every write and skipped on read.
const RETENTION_DAYS: i64 = 30;

/// Hard cap on stored rows; oldest are dropped first.
const MAX_ROWS: usize = 2000;

/// Append-only, retention-bounded activity log.
#[derive(Clone)]
pub struct ActivityRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
    id_gen: IdGenerator,
}

impl ActivityRepository {
    /// Create a new activity repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
            id_gen: IdGenerator::new(),
        }
    }

    async fn read_all(&self) -> AppResult<Vec<SocialActivityRecord>> {
        let rows = self.store.read_array(STORE_KEY).await?;
        decode_rows(STORE_KEY, rows)
    }

    /// Append a row, pruning expired and over-cap rows in the same write.
    pub async fn append(
        &self,
        kind: ActivityKind,
        actor_user_id: &str,
        target_user_id: Option<&str>,
        favorite: Option<FavoriteRef>,
    ) -> AppResult<SocialActivityRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;

        let record = SocialActivityRecord {
            id: self.id_gen.generate(),
            kind,
            actor_user_id: actor_user_id.to_string(),
            target_user_id: target_user_id.map(ToString::to_string),
            favorite,
            created_at: Utc::now(),
        };
        records.push(record.clone());

        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        records.retain(|r| r.created_at >= cutoff);
        sort_rows(&mut records);
        records.truncate(MAX_ROWS);

        let rows = encode_rows(STORE_KEY, &records)?;
        self.store.write_array(STORE_KEY, rows).await?;
        Ok(record)
    }

    /// One raw page of the log in canonical order. Expired rows are
    /// skipped even if a prune has not run since they aged out.
    pub async fn list_page(
        &self,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> AppResult<Page<SocialActivityRecord>> {
        let records = self.read_all().await?;
        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        let live: Vec<SocialActivityRecord> = records
            .into_iter()
            .filter(|r| r.created_at >= cutoff)
            .collect();
        Ok(paginate(live, cursor, limit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::MemoryStore;

    fn record_at(id: &str, actor: &str, age_days: i64) -> SocialActivityRecord {
        SocialActivityRecord {
            id: id.to_string(),
            kind: ActivityKind::FriendRequestSent,
            actor_user_id: actor.to_string(),
            target_user_id: None,
            favorite: None,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    async fn seed(store: &MemoryStore, records: &[SocialActivityRecord]) {
        let rows = encode_rows(STORE_KEY, records).unwrap();
        store.write_array(STORE_KEY, rows).await.unwrap();
    }

    #[tokio::test]
    async fn test_append_and_page() {
        let repo = ActivityRepository::new(Arc::new(MemoryStore::new()));
        for i in 0..5 {
            repo.append(ActivityKind::FriendRequestSent, &format!("user{i}"), Some("bob"), None)
                .await
                .unwrap();
        }

        let page = repo.list_page(None, 10).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_expired_rows_are_not_returned() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &[record_at("old", "alice", 31), record_at("new", "alice", 1)]).await;

        let repo = ActivityRepository::new(store);
        let page = repo.list_page(None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "new");
    }

    #[tokio::test]
    async fn test_write_prunes_expired_rows() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &[record_at("old", "alice", 31)]).await;

        let repo = ActivityRepository::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        repo.append(ActivityKind::FriendRemoved, "bob", Some("alice"), None)
            .await
            .unwrap();

        let raw = store.read_array(STORE_KEY).await.unwrap();
        assert_eq!(raw.len(), 1);
    }

    #[tokio::test]
    async fn test_cap_drops_oldest_first() {
        let store = Arc::new(MemoryStore::new());
        // 2100 in-retention rows with distinct ages.
        let records: Vec<SocialActivityRecord> = (0..2100)
            .map(|i| SocialActivityRecord {
                id: format!("id{i:04}"),
                kind: ActivityKind::FavoriteAdded,
                actor_user_id: "alice".to_string(),
                target_user_id: None,
                favorite: None,
                created_at: Utc::now() - Duration::seconds(i),
            })
            .collect();
        seed(&store, &records).await;

        let repo = ActivityRepository::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        repo.append(ActivityKind::FriendRequestSent, "bob", None, None)
            .await
            .unwrap();

        let raw = store.read_array(STORE_KEY).await.unwrap();
        assert_eq!(raw.len(), MAX_ROWS);

        // The newest rows survived.
        let kept: Vec<SocialActivityRecord> = decode_rows(STORE_KEY, raw).unwrap();
        assert!(kept.iter().any(|r| r.actor_user_id == "bob"));
        assert!(kept.iter().all(|r| r.id != "id2099"));
    }
}
