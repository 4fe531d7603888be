//! Moderation report record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::Chronological;

/// Why a user was reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Abuse,
    Impersonation,
    Other,
}

/// Lifecycle state of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    Resolved,
    Dismissed,
}

/// A moderation ticket. Created `open`; a moderator moves it to
/// `resolved`/`dismissed` (or back to `open` to reopen), recording who
/// reviewed it and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialReportRecord {
    pub id: String,
    pub reporter_user_id: String,
    pub target_user_id: String,
    pub reason: ReportReason,
    pub notes: Option<String>,
    pub status: ReportStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by_user_id: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Chronological for SocialReportRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn sort_id(&self) -> &str {
        &self.id
    }
}
