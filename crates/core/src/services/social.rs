//! Social graph orchestration.
//!
//! Gates every friendship mutation behind block and policy checks, then
//! fans out activity rows and notifications as best-effort side effects.
//! A failed side effect is logged and swallowed; the primary mutation has
//! already committed.

use std::sync::Arc;

use dexsocial_common::{AppError, AppResult};
use dexsocial_store::records::{
    ActivityKind, BlockRelation, FriendRequestPolicy, FriendshipRecord, FriendshipStatus,
    PresenceVisibility, SocialPrivacySettingsRecord,
};
use dexsocial_store::repositories::{
    ActivityRepository, BlockRepository, FriendshipRepository, PrivacySettingsRepository,
    RequestOutcome,
};
use futures::future::try_join_all;

use crate::directory::UserDirectory;
use crate::services::{NotificationService, PresenceService};
use crate::views::{
    FriendNetworkSnapshot, FriendshipRelationView, RelationStatus, SocialUserSummary,
};

/// Relation between viewer and target after block masking.
///
/// Blocks take precedence over any surviving friendship record, so a
/// viewer never learns the friendship state of someone they are in a
/// block relation with.
#[must_use]
pub fn derive_relation_status(
    viewer: &str,
    target: &str,
    friendship: Option<&FriendshipRecord>,
    blocks: &BlockRelation,
) -> RelationStatus {
    if viewer == target {
        return RelationStatus::Me;
    }
    if blocks.viewer_blocked_target {
        return RelationStatus::BlockedByYou;
    }
    if blocks.target_blocked_viewer {
        return RelationStatus::BlockedYou;
    }
    match friendship {
        Some(f) if f.status == FriendshipStatus::Accepted => RelationStatus::Friends,
        Some(f) if f.requested_by == viewer => RelationStatus::OutgoingPending,
        Some(_) => RelationStatus::IncomingPending,
        None => RelationStatus::None,
    }
}

/// Social graph service: friendships, blocks, and privacy settings.
#[derive(Clone)]
pub struct SocialService {
    friendship_repo: FriendshipRepository,
    block_repo: BlockRepository,
    privacy_repo: PrivacySettingsRepository,
    activity_repo: ActivityRepository,
    notifications: NotificationService,
    presence: PresenceService,
    directory: Arc<dyn UserDirectory>,
}

impl SocialService {
    /// Create a new social service.
    #[must_use]
    pub fn new(
        friendship_repo: FriendshipRepository,
        block_repo: BlockRepository,
        privacy_repo: PrivacySettingsRepository,
        activity_repo: ActivityRepository,
        notifications: NotificationService,
        presence: PresenceService,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            friendship_repo,
            block_repo,
            privacy_repo,
            activity_repo,
            notifications,
            presence,
            directory,
        }
    }

    async fn ensure_user_exists(&self, user_id: &str) -> AppResult<()> {
        if self.directory.find_user_by_id(user_id).await?.is_none() {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }

    /// Gate a social action from `actor` towards `target`.
    ///
    /// Fails if either party has blocked the other, and, when
    /// `check_request_policy` is set, if the target declines friend
    /// requests. The block error deliberately does not reveal which
    /// direction the block runs.
    async fn ensure_social_action_allowed(
        &self,
        actor: &str,
        target: &str,
        check_request_policy: bool,
    ) -> AppResult<()> {
        let blocks = self.block_repo.get_relation(actor, target).await?;
        if blocks.any() {
            return Err(AppError::Forbidden(
                "You cannot interact with this user".to_string(),
            ));
        }
        if check_request_policy {
            let settings = self.privacy_repo.get(target).await?;
            if settings.friend_request_policy == FriendRequestPolicy::NoOne {
                return Err(AppError::Forbidden(
                    "This user is not accepting friend requests".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Send a friend request from `actor` to `target`.
    ///
    /// A reciprocal request accepts the existing pending record instead of
    /// creating a duplicate. No-op outcomes produce no side effects.
    pub async fn request_friendship(
        &self,
        actor: &str,
        target: &str,
    ) -> AppResult<(FriendshipRecord, RequestOutcome)> {
        if actor == target {
            return Err(AppError::BadRequest("Cannot friend yourself".to_string()));
        }
        self.ensure_user_exists(target).await?;
        self.ensure_social_action_allowed(actor, target, true).await?;

        let (record, outcome) = self.friendship_repo.request_friendship(actor, target).await?;
        match outcome {
            RequestOutcome::RequestSent => {
                if let Err(e) = self
                    .activity_repo
                    .append(ActivityKind::FriendRequestSent, actor, Some(target), None)
                    .await
                {
                    tracing::warn!(error = %e, "Failed to log friend request activity");
                }
                if let Err(e) = self
                    .notifications
                    .notify_incoming_friend_request(target, actor)
                    .await
                {
                    tracing::warn!(error = %e, "Failed to notify friend request");
                }
            }
            RequestOutcome::AutoAccepted => {
                self.fan_out_accepted(actor, target).await;
            }
            RequestOutcome::AlreadyPending | RequestOutcome::AlreadyFriends => {}
        }
        Ok((record, outcome))
    }

    /// The other party of a relation the actor is part of. Shared
    /// lookup for the gate on relation-id flows.
    async fn relation_counterpart(&self, actor: &str, relation_id: &str) -> AppResult<String> {
        let record = self
            .friendship_repo
            .get_by_id(relation_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Relation not found: {relation_id}")))?;
        let other = record
            .other_party(actor)
            .ok_or_else(|| AppError::Forbidden("Relation does not belong to you".to_string()))?;
        Ok(other.to_string())
    }

    /// Accept a pending request addressed to `actor`.
    pub async fn accept_friendship(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let other = self.relation_counterpart(actor, relation_id).await?;
        self.ensure_social_action_allowed(actor, &other, false).await?;
        let record = self.friendship_repo.accept_incoming(actor, relation_id).await?;
        if let Some(requester) = record.other_party(actor) {
            self.fan_out_accepted(actor, requester).await;
        }
        Ok(record)
    }

    async fn fan_out_accepted(&self, acceptor: &str, requester: &str) {
        if let Err(e) = self
            .activity_repo
            .append(
                ActivityKind::FriendRequestAccepted,
                acceptor,
                Some(requester),
                None,
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to log friendship acceptance activity");
        }
        if let Err(e) = self
            .notifications
            .notify_friend_request_accepted(requester, acceptor)
            .await
        {
            tracing::warn!(error = %e, "Failed to notify friendship acceptance");
        }
    }

    /// Reject a pending request addressed to `actor`. Rejection is silent:
    /// no activity row, no notification to the requester.
    pub async fn reject_friendship(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let other = self.relation_counterpart(actor, relation_id).await?;
        self.ensure_social_action_allowed(actor, &other, false).await?;
        self.friendship_repo.reject_incoming(actor, relation_id).await
    }

    /// Cancel a pending request initiated by `actor`. Silent, like reject.
    pub async fn cancel_friendship_request(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let other = self.relation_counterpart(actor, relation_id).await?;
        self.ensure_social_action_allowed(actor, &other, false).await?;
        self.friendship_repo.cancel_outgoing(actor, relation_id).await
    }

    /// Remove an accepted friendship `actor` is a party of.
    pub async fn remove_friendship(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let other = self.relation_counterpart(actor, relation_id).await?;
        self.ensure_social_action_allowed(actor, &other, false).await?;
        let record = self.friendship_repo.remove_accepted(actor, relation_id).await?;
        if let Some(other) = record.other_party(actor) {
            if let Err(e) = self
                .activity_repo
                .append(ActivityKind::FriendRemoved, actor, Some(other), None)
                .await
            {
                tracing::warn!(error = %e, "Failed to log friend removal activity");
            }
            if let Err(e) = self.notifications.notify_friend_removed(other, actor).await {
                tracing::warn!(error = %e, "Failed to notify friend removal");
            }
        }
        Ok(record)
    }

    /// Block a user. Idempotent; any friendship or pending request between
    /// the pair is force-deleted in the same call.
    pub async fn block_user(&self, actor: &str, target: &str) -> AppResult<()> {
        if actor == target {
            return Err(AppError::BadRequest("Cannot block yourself".to_string()));
        }
        self.ensure_user_exists(target).await?;

        self.block_repo.block(actor, target).await?;
        if let Err(e) = self.friendship_repo.delete_between(actor, target).await {
            tracing::warn!(error = %e, "Failed to sever friendship on block");
        }
        Ok(())
    }

    /// Unblock a user. The severed friendship is not restored.
    pub async fn unblock_user(&self, actor: &str, target: &str) -> AppResult<()> {
        self.block_repo.unblock(actor, target).await
    }

    /// Users the actor has blocked, as summaries.
    pub async fn list_blocked(&self, actor: &str) -> AppResult<Vec<SocialUserSummary>> {
        let records = self.block_repo.list_blocked_by_blocker(actor).await?;
        let summaries = try_join_all(
            records
                .iter()
                .map(|r| self.user_summary(actor, &r.blocked_user_id)),
        )
        .await?;
        Ok(summaries)
    }

    /// The relation between viewer and target, block-masked.
    pub async fn relation_to(&self, viewer: &str, target: &str) -> AppResult<FriendshipRelationView> {
        self.ensure_user_exists(target).await?;
        let friendship = self.friendship_repo.get_between(viewer, target).await?;
        let blocks = self.block_repo.get_relation(viewer, target).await?;
        let status = derive_relation_status(viewer, target, friendship.as_ref(), &blocks);

        // A block masks the underlying record entirely.
        let friendship = if blocks.any() { None } else { friendship };
        Ok(FriendshipRelationView {
            status,
            relation_id: friendship.as_ref().map(|f| f.id.clone()),
            requested_by: friendship
                .as_ref()
                .filter(|f| f.status == FriendshipStatus::Pending)
                .map(|f| f.requested_by.clone()),
            since: friendship.as_ref().and_then(|f| f.accepted_at),
        })
    }

    /// One user as the viewer sees them.
    pub async fn user_summary(&self, viewer: &str, target: &str) -> AppResult<SocialUserSummary> {
        let user = self
            .directory
            .find_user_by_id(target)
            .await?
            .ok_or_else(|| AppError::UserNotFound(target.to_string()))?;
        let profile = self.directory.get_profile(target).await?;

        let friendship = self.friendship_repo.get_between(viewer, target).await?;
        let blocks = self.block_repo.get_relation(viewer, target).await?;
        let relation = derive_relation_status(viewer, target, friendship.as_ref(), &blocks);
        let relation_id = if blocks.any() {
            None
        } else {
            friendship.map(|f| f.id)
        };
        let presence = self.presence.resolve_for_viewer(viewer, target).await?;

        let name = profile
            .as_ref()
            .and_then(|p| p.display_name.clone())
            .unwrap_or(user.name);
        Ok(SocialUserSummary {
            user_id: user.id,
            name,
            avatar_url: profile.and_then(|p| p.avatar_url),
            relation,
            relation_id,
            presence,
        })
    }

    /// The user's friends and pending requests, block-filtered.
    ///
    /// A block that raced a surviving friendship record hides the row
    /// rather than surfacing a blocked party in a friend list.
    pub async fn network_snapshot(&self, user_id: &str) -> AppResult<FriendNetworkSnapshot> {
        let records = self.friendship_repo.list_for_user(user_id).await?;
        let blocked = self.block_repo.list_blocked_ids_for_viewer(user_id).await?;

        let mut friends = Vec::new();
        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        for record in &records {
            let Some(other) = record.other_party(user_id) else {
                continue;
            };
            let other = other.to_string();
            if blocked.contains(&other) {
                continue;
            }
            match record.status {
                FriendshipStatus::Accepted => friends.push(other),
                FriendshipStatus::Pending if record.requested_by == user_id => {
                    outgoing.push(other);
                }
                FriendshipStatus::Pending => incoming.push(other),
            }
        }

        Ok(FriendNetworkSnapshot {
            friends: self.summaries(user_id, friends).await?,
            incoming: self.summaries(user_id, incoming).await?,
            outgoing: self.summaries(user_id, outgoing).await?,
        })
    }

    async fn summaries(
        &self,
        viewer: &str,
        targets: Vec<String>,
    ) -> AppResult<Vec<SocialUserSummary>> {
        try_join_all(targets.iter().map(|t| self.user_summary(viewer, t))).await
    }

    /// The user's privacy settings, defaulted when never saved.
    pub async fn get_settings(&self, user_id: &str) -> AppResult<SocialPrivacySettingsRecord> {
        self.privacy_repo.get(user_id).await
    }

    /// Replace the user's privacy settings.
    pub async fn update_settings(
        &self,
        user_id: &str,
        friend_request_policy: FriendRequestPolicy,
        presence_visibility: PresenceVisibility,
    ) -> AppResult<SocialPrivacySettingsRecord> {
        self.privacy_repo
            .upsert(user_id, friend_request_policy, presence_visibility)
            .await
    }
}
