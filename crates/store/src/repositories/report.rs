//! Report repository.

use std::sync::Arc;

use chrono::Utc;
use dexsocial_common::{AppError, AppResult, IdGenerator};
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::pagination::{Cursor, Page, paginate};
use crate::records::{ReportReason, ReportStatus, SocialReportRecord};
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_reports";

/// Report repository for the moderation ticket lifecycle.
#[derive(Clone)]
pub struct ReportRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
    id_gen: IdGenerator,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
            id_gen: IdGenerator::new(),
        }
    }

    async fn read_all(&self) -> AppResult<Vec<SocialReportRecord>> {
        let rows = self.store.read_array(STORE_KEY).await?;
        decode_rows(STORE_KEY, rows)
    }

    async fn write_all(&self, records: &[SocialReportRecord]) -> AppResult<()> {
        let rows = encode_rows(STORE_KEY, records)?;
        self.store.write_array(STORE_KEY, rows).await
    }

    /// File a new report. Always starts `open`.
    pub async fn create(
        &self,
        reporter_user_id: &str,
        target_user_id: &str,
        reason: ReportReason,
        notes: Option<String>,
    ) -> AppResult<SocialReportRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;

        let record = SocialReportRecord {
            id: self.id_gen.generate(),
            reporter_user_id: reporter_user_id.to_string(),
            target_user_id: target_user_id.to_string(),
            reason,
            notes,
            status: ReportStatus::Open,
            reviewed_at: None,
            reviewed_by_user_id: None,
            review_notes: None,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        self.write_all(&records).await?;
        Ok(record)
    }

    /// Find a report by id.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<SocialReportRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    /// Cursor-paginated listing, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> AppResult<Page<SocialReportRecord>> {
        let records = self.read_all().await?;
        let filtered: Vec<SocialReportRecord> = records
            .into_iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .collect();
        Ok(paginate(filtered, cursor, limit))
    }

    /// Record a review decision: resolve, dismiss, or reopen. Full-record
    /// replace; reviewer identity and timestamp are always recorded.
    pub async fn review(
        &self,
        id: &str,
        status: ReportStatus,
        reviewer_user_id: &str,
        review_notes: Option<String>,
    ) -> AppResult<SocialReportRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;

        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(AppError::NotFound(format!("Report not found: {id}")));
        };

        records[pos].status = status;
        records[pos].reviewed_at = Some(Utc::now());
        records[pos].reviewed_by_user_id = Some(reviewer_user_id.to_string());
        records[pos].review_notes = review_notes;

        let record = records[pos].clone();
        self.write_all(&records).await?;
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::MemoryStore;

    fn repo() -> ReportRepository {
        ReportRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_reports_start_open() {
        let repo = repo();
        let report = repo
            .create("alice", "bob", ReportReason::Spam, Some("spamming trades".into()))
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Open);
        assert!(report.reviewed_at.is_none());
    }

    #[tokio::test]
    async fn test_review_records_reviewer_and_timestamp() {
        let repo = repo();
        let report = repo
            .create("alice", "bob", ReportReason::Abuse, None)
            .await
            .unwrap();

        let reviewed = repo
            .review(&report.id, ReportStatus::Resolved, "mod1", Some("handled".into()))
            .await
            .unwrap();
        assert_eq!(reviewed.status, ReportStatus::Resolved);
        assert_eq!(reviewed.reviewed_by_user_id.as_deref(), Some("mod1"));
        assert!(reviewed.reviewed_at.is_some());

        // Reopen keeps the review trail.
        let reopened = repo
            .review(&report.id, ReportStatus::Open, "mod2", None)
            .await
            .unwrap();
        assert_eq!(reopened.status, ReportStatus::Open);
        assert_eq!(reopened.reviewed_by_user_id.as_deref(), Some("mod2"));
    }

    #[tokio::test]
    async fn test_review_unknown_report_is_not_found() {
        let repo = repo();
        let err = repo
            .review("missing", ReportStatus::Dismissed, "mod1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let repo = repo();
        let first = repo
            .create("alice", "bob", ReportReason::Spam, None)
            .await
            .unwrap();
        repo.create("carol", "bob", ReportReason::Other, None)
            .await
            .unwrap();
        repo.review(&first.id, ReportStatus::Dismissed, "mod1", None)
            .await
            .unwrap();

        let open = repo.list(Some(ReportStatus::Open), None, 10).await.unwrap();
        assert_eq!(open.items.len(), 1);
        assert_eq!(open.items[0].reporter_user_id, "carol");

        let all = repo.list(None, None, 10).await.unwrap();
        assert_eq!(all.items.len(), 2);
    }
}
