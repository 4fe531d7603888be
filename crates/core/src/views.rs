//! View shapes emitted to the presentation layer.
//!
//! All of these are pure derivations recomputed on every request; nothing
//! here is persisted or cached.

use chrono::{DateTime, Utc};
use dexsocial_store::records::{
    ActivityKind, FavoriteRef, NotificationKind, ReportReason, ReportStatus,
};
use serde::Serialize;

/// Relationship between a viewer and a target user, after block masking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    /// Viewer and target are the same user.
    #[serde(rename = "self")]
    Me,
    /// Viewer has blocked the target.
    BlockedByYou,
    /// Target has blocked the viewer.
    BlockedYou,
    /// No relationship.
    None,
    /// Accepted friendship.
    Friends,
    /// Pending request initiated by the viewer.
    OutgoingPending,
    /// Pending request addressed to the viewer.
    IncomingPending,
}

/// Per-viewer presence classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    Online,
    Offline,
    Hidden,
}

/// Presence as one viewer sees one target.
///
/// `hidden` is a state label, not a redaction of the timestamp field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceView {
    pub state: PresenceState,
    pub last_active_at: Option<DateTime<Utc>>,
}

/// A user as rendered in friend lists, search results, and feed rows.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialUserSummary {
    pub user_id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub relation: RelationStatus,
    pub relation_id: Option<String>,
    pub presence: PresenceView,
}

/// The relation between two users, without the full summaries.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipRelationView {
    pub status: RelationStatus,
    pub relation_id: Option<String>,
    /// Who initiated, while pending.
    pub requested_by: Option<String>,
    /// When the friendship was accepted.
    pub since: Option<DateTime<Utc>>,
}

/// A user's friends and pending requests, block-filtered.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendNetworkSnapshot {
    pub friends: Vec<SocialUserSummary>,
    pub incoming: Vec<SocialUserSummary>,
    pub outgoing: Vec<SocialUserSummary>,
}

/// One surfaced feed row.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialActivityView {
    pub id: String,
    pub kind: ActivityKind,
    pub actor_user_id: String,
    pub actor_name: String,
    pub actor_avatar_url: Option<String>,
    pub target_user_id: Option<String>,
    pub favorite: Option<FavoriteRef>,
    pub created_at: DateTime<Utc>,
}

/// One notification row as rendered in the inbox.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialNotificationView {
    pub id: String,
    pub kind: NotificationKind,
    pub actor_user_id: Option<String>,
    pub actor_name: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub href: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One report row as rendered in the admin dashboard.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialReportAdminView {
    pub id: String,
    pub reporter_user_id: String,
    pub reporter_name: Option<String>,
    pub target_user_id: String,
    pub target_name: Option<String>,
    pub reason: ReportReason,
    pub notes: Option<String>,
    pub status: ReportStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by_user_id: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One ranked friend-search result.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendCandidateView {
    pub user_id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub score: i64,
}
