//! Typed records persisted in the document store.
//!
//! Rows cross the store boundary as JSON; the structs here are the schema,
//! deserialized (and invariant-checked where a record carries invariants)
//! when an array is read. Malformed rows are rejected, not silently
//! filtered.

pub mod activity;
pub mod block;
pub mod friendship;
pub mod notification;
pub mod presence;
pub mod privacy;
pub mod report;

pub use activity::{ActivityKind, FavoriteRef, SocialActivityRecord};
pub use block::{BlockRelation, SocialBlockRecord, build_block_id};
pub use friendship::{FriendshipRecord, FriendshipStatus, build_friendship_id};
pub use notification::{NotificationKind, SocialNotificationRecord};
pub use presence::SocialPresenceRecord;
pub use privacy::{FriendRequestPolicy, PresenceVisibility, SocialPrivacySettingsRecord};
pub use report::{ReportReason, ReportStatus, SocialReportRecord};
