//! Notification service.
//!
//! Builds and delivers per-recipient notifications and serves the inbox.
//! Delivery is a best-effort side effect of the social flows; callers
//! swallow failures so the primary mutation still succeeds.

use std::sync::Arc;

use dexsocial_common::{AppError, AppResult};
use dexsocial_store::pagination::{Cursor, Page};
use dexsocial_store::records::{NotificationKind, SocialNotificationRecord};
use dexsocial_store::repositories::NotificationRepository;
use futures::future::try_join_all;

use crate::directory::UserDirectory;
use crate::views::SocialNotificationView;

/// Notification service for delivery and inbox reads.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    directory: Arc<dyn UserDirectory>,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(notification_repo: NotificationRepository, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            notification_repo,
            directory,
        }
    }

    async fn actor_name(&self, actor_id: &str) -> String {
        match self.directory.find_user_by_id(actor_id).await {
            Ok(Some(user)) => user.name,
            _ => actor_id.to_string(),
        }
    }

    /// Notify `recipient` of an incoming friend request from `actor`.
    pub async fn notify_incoming_friend_request(
        &self,
        recipient: &str,
        actor: &str,
    ) -> AppResult<SocialNotificationRecord> {
        let name = self.actor_name(actor).await;
        self.notification_repo
            .append(
                recipient,
                NotificationKind::IncomingFriendRequest,
                Some(actor),
                &format!("{name} sent you a friend request"),
                None,
                Some(&format!("/users/{actor}")),
            )
            .await
    }

    /// Notify `recipient` that `actor` accepted their friend request.
    pub async fn notify_friend_request_accepted(
        &self,
        recipient: &str,
        actor: &str,
    ) -> AppResult<SocialNotificationRecord> {
        let name = self.actor_name(actor).await;
        self.notification_repo
            .append(
                recipient,
                NotificationKind::FriendRequestAccepted,
                Some(actor),
                &format!("{name} accepted your friend request"),
                None,
                Some(&format!("/users/{actor}")),
            )
            .await
    }

    /// Notify `recipient` that `actor` removed the friendship.
    pub async fn notify_friend_removed(
        &self,
        recipient: &str,
        actor: &str,
    ) -> AppResult<SocialNotificationRecord> {
        let name = self.actor_name(actor).await;
        self.notification_repo
            .append(
                recipient,
                NotificationKind::FriendRemoved,
                Some(actor),
                &format!("{name} removed you as a friend"),
                None,
                None,
            )
            .await
    }

    /// Acknowledge a submitted report to the reporter.
    pub async fn notify_report_submitted(
        &self,
        recipient: &str,
    ) -> AppResult<SocialNotificationRecord> {
        self.notification_repo
            .append(
                recipient,
                NotificationKind::SocialReportSubmitted,
                None,
                "Your report was received",
                Some("A moderator will review it shortly."),
                None,
            )
            .await
    }

    /// One page of a recipient's inbox, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        cursor: Option<&str>,
        limit: usize,
    ) -> AppResult<Page<SocialNotificationView>> {
        let cursor = cursor.map(Cursor::decode).transpose()?;
        let page = self
            .notification_repo
            .list_page_for_user(user_id, unread_only, cursor.as_ref(), limit)
            .await?;

        let views = try_join_all(page.items.iter().map(|record| self.to_view(record))).await?;
        Ok(Page {
            items: views,
            next_cursor: page.next_cursor,
        })
    }

    async fn to_view(&self, record: &SocialNotificationRecord) -> AppResult<SocialNotificationView> {
        let actor_name = match &record.actor_user_id {
            Some(actor) => self
                .directory
                .find_user_by_id(actor)
                .await?
                .map(|u| u.name),
            None => None,
        };
        Ok(SocialNotificationView {
            id: record.id.clone(),
            kind: record.kind,
            actor_user_id: record.actor_user_id.clone(),
            actor_name,
            title: record.title.clone(),
            body: record.body.clone(),
            href: record.href.clone(),
            read_at: record.read_at,
            created_at: record.created_at,
        })
    }

    /// Count unread notifications.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<usize> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one notification read, verifying it belongs to the caller.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        self.ensure_owned(user_id, notification_id).await?;
        self.notification_repo.mark_read(notification_id).await?;
        Ok(())
    }

    /// Mark all of the caller's notifications read. Returns how many
    /// changed.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<usize> {
        self.notification_repo.mark_all_read(user_id).await
    }

    /// Delete one notification, verifying it belongs to the caller.
    pub async fn delete(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        self.ensure_owned(user_id, notification_id).await?;
        self.notification_repo.delete(notification_id).await
    }

    async fn ensure_owned(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let record = self
            .notification_repo
            .get_by_id(notification_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Notification not found: {notification_id}"))
            })?;
        if record.user_id != user_id {
            return Err(AppError::Forbidden(
                "Notification does not belong to you".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::{MemoryDirectory, test_user};
    use dexsocial_store::test_utils::memory_store;

    async fn service() -> NotificationService {
        let directory = MemoryDirectory::shared();
        directory.insert_user(test_user("alice", "Alice")).await;
        directory.insert_user(test_user("bob", "Bob")).await;
        NotificationService::new(NotificationRepository::new(memory_store()), directory)
    }

    #[tokio::test]
    async fn test_friend_request_notification_names_actor() {
        let service = service().await;
        let record = service
            .notify_incoming_friend_request("bob", "alice")
            .await
            .unwrap();
        assert_eq!(record.title, "Alice sent you a friend request");
        assert_eq!(record.href.as_deref(), Some("/users/alice"));

        let page = service.list("bob", false, None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].actor_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_unknown_actor_falls_back_to_id() {
        let service = service().await;
        let record = service
            .notify_friend_removed("bob", "ghost")
            .await
            .unwrap();
        assert_eq!(record.title, "ghost removed you as a friend");
    }

    #[tokio::test]
    async fn test_mark_read_checks_ownership() {
        let service = service().await;
        let record = service
            .notify_incoming_friend_request("bob", "alice")
            .await
            .unwrap();

        let err = service.mark_read("alice", &record.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service.mark_read("bob", &record.id).await.unwrap();
        assert_eq!(service.count_unread("bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_checks_ownership() {
        let service = service().await;
        let record = service
            .notify_report_submitted("alice")
            .await
            .unwrap();

        let err = service.delete("bob", &record.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service.delete("alice", &record.id).await.unwrap();
        let err = service.delete("alice", &record.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
