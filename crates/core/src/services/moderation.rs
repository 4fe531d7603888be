//! Moderation service.
//!
//! Wraps the report ticket lifecycle with input validation and renders
//! admin views with resolved user names.

use std::sync::Arc;

use dexsocial_common::{AppError, AppResult};
use dexsocial_store::pagination::{Cursor, Page};
use dexsocial_store::records::{ReportReason, ReportStatus, SocialReportRecord};
use dexsocial_store::repositories::ReportRepository;
use futures::future::try_join_all;

use crate::directory::UserDirectory;
use crate::services::NotificationService;
use crate::views::SocialReportAdminView;

/// Notes longer than this are rejected, never truncated.
const MAX_NOTES_LEN: usize = 2000;

/// Moderation service for the report lifecycle.
#[derive(Clone)]
pub struct ModerationService {
    report_repo: ReportRepository,
    notifications: NotificationService,
    directory: Arc<dyn UserDirectory>,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        notifications: NotificationService,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            report_repo,
            notifications,
            directory,
        }
    }

    /// File a report against another user.
    ///
    /// The reporter gets a best-effort acknowledgement notification.
    pub async fn submit_report(
        &self,
        reporter: &str,
        target: &str,
        reason: ReportReason,
        notes: Option<String>,
    ) -> AppResult<SocialReportRecord> {
        if reporter == target {
            return Err(AppError::BadRequest("Cannot report yourself".to_string()));
        }
        if self.directory.find_user_by_id(target).await?.is_none() {
            return Err(AppError::UserNotFound(target.to_string()));
        }
        let notes = Self::clean_notes(notes)?;

        let record = self
            .report_repo
            .create(reporter, target, reason, notes)
            .await?;
        if let Err(e) = self.notifications.notify_report_submitted(reporter).await {
            tracing::warn!(error = %e, "Failed to acknowledge report submission");
        }
        Ok(record)
    }

    fn clean_notes(notes: Option<String>) -> AppResult<Option<String>> {
        let Some(notes) = notes else {
            return Ok(None);
        };
        let trimmed = notes.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.len() > MAX_NOTES_LEN {
            return Err(AppError::Validation(format!(
                "Notes exceed {MAX_NOTES_LEN} characters"
            )));
        }
        Ok(Some(trimmed.to_string()))
    }

    /// One page of reports for the admin dashboard, optionally filtered
    /// by status.
    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        cursor: Option<&str>,
        limit: usize,
    ) -> AppResult<Page<SocialReportAdminView>> {
        let cursor = cursor.map(Cursor::decode).transpose()?;
        let page = self.report_repo.list(status, cursor.as_ref(), limit).await?;

        let views = try_join_all(page.items.iter().map(|r| self.to_view(r))).await?;
        Ok(Page {
            items: views,
            next_cursor: page.next_cursor,
        })
    }

    /// One report by id.
    pub async fn get_report(&self, report_id: &str) -> AppResult<SocialReportAdminView> {
        let record = self
            .report_repo
            .get_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report not found: {report_id}")))?;
        self.to_view(&record).await
    }

    /// Record a review decision: resolve, dismiss, or reopen.
    pub async fn review_report(
        &self,
        reviewer: &str,
        report_id: &str,
        status: ReportStatus,
        review_notes: Option<String>,
    ) -> AppResult<SocialReportAdminView> {
        let review_notes = Self::clean_notes(review_notes)?;
        let record = self
            .report_repo
            .review(report_id, status, reviewer, review_notes)
            .await?;
        self.to_view(&record).await
    }

    async fn to_view(&self, record: &SocialReportRecord) -> AppResult<SocialReportAdminView> {
        let reporter = self
            .directory
            .find_user_by_id(&record.reporter_user_id)
            .await?;
        let target = self.directory.find_user_by_id(&record.target_user_id).await?;
        Ok(SocialReportAdminView {
            id: record.id.clone(),
            reporter_user_id: record.reporter_user_id.clone(),
            reporter_name: reporter.map(|u| u.name),
            target_user_id: record.target_user_id.clone(),
            target_name: target.map(|u| u.name),
            reason: record.reason,
            notes: record.notes.clone(),
            status: record.status,
            reviewed_at: record.reviewed_at,
            reviewed_by_user_id: record.reviewed_by_user_id.clone(),
            review_notes: record.review_notes.clone(),
            created_at: record.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::{MemoryDirectory, test_user};
    use dexsocial_store::repositories::NotificationRepository;
    use dexsocial_store::test_utils::memory_store;

    struct Fixture {
        moderation: ModerationService,
        notifications: NotificationService,
    }

    async fn fixture() -> Fixture {
        let store = memory_store();
        let directory = MemoryDirectory::shared();
        directory.insert_user(test_user("alice", "Alice")).await;
        directory.insert_user(test_user("bob", "Bob")).await;

        let notifications = NotificationService::new(
            NotificationRepository::new(store.clone()),
            directory.clone(),
        );
        let moderation = ModerationService::new(
            ReportRepository::new(store),
            notifications.clone(),
            directory,
        );
        Fixture {
            moderation,
            notifications,
        }
    }

    #[tokio::test]
    async fn test_submit_acknowledges_reporter() {
        let f = fixture().await;
        let record = f
            .moderation
            .submit_report("alice", "bob", ReportReason::Spam, Some("  spam links  ".into()))
            .await
            .unwrap();

        assert_eq!(record.status, ReportStatus::Open);
        // Notes are stored trimmed.
        assert_eq!(record.notes.as_deref(), Some("spam links"));
        assert_eq!(f.notifications.count_unread("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_self_report_is_rejected() {
        let f = fixture().await;
        let err = f
            .moderation
            .submit_report("alice", "alice", ReportReason::Other, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_target_is_rejected() {
        let f = fixture().await;
        let err = f
            .moderation
            .submit_report("alice", "ghost", ReportReason::Spam, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_oversized_notes_are_rejected() {
        let f = fixture().await;
        let err = f
            .moderation
            .submit_report("alice", "bob", ReportReason::Abuse, Some("x".repeat(2001)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_notes_become_none() {
        let f = fixture().await;
        let record = f
            .moderation
            .submit_report("alice", "bob", ReportReason::Abuse, Some("   ".into()))
            .await
            .unwrap();
        assert!(record.notes.is_none());
    }

    #[tokio::test]
    async fn test_admin_view_resolves_names() {
        let f = fixture().await;
        f.moderation
            .submit_report("alice", "bob", ReportReason::Impersonation, None)
            .await
            .unwrap();

        let page = f.moderation.list_reports(None, None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].reporter_name.as_deref(), Some("Alice"));
        assert_eq!(page.items[0].target_name.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn test_review_and_reopen() {
        let f = fixture().await;
        let record = f
            .moderation
            .submit_report("alice", "bob", ReportReason::Spam, None)
            .await
            .unwrap();

        let reviewed = f
            .moderation
            .review_report("mod1", &record.id, ReportStatus::Resolved, Some("done".into()))
            .await
            .unwrap();
        assert_eq!(reviewed.status, ReportStatus::Resolved);
        assert_eq!(reviewed.reviewed_by_user_id.as_deref(), Some("mod1"));

        let open = f
            .moderation
            .list_reports(Some(ReportStatus::Open), None, 10)
            .await
            .unwrap();
        assert!(open.items.is_empty());
    }
}
