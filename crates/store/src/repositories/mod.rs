//! Repositories over the document store.
//!
//! Each repository owns exactly one store key and one write guard. Every
//! mutating call runs its whole read-modify-write cycle while holding the
//! guard, so concurrent mutations against the same store never interleave.
//! Reads are deliberately unguarded; a dirty read of an in-flight write is
//! acceptable. Nothing here awaits another repository's guard while
//! holding its own, so the guards cannot deadlock.

mod activity;
mod block;
mod friendship;
mod notification;
mod presence;
mod privacy;
mod report;

pub use activity::ActivityRepository;
pub use block::BlockRepository;
pub use friendship::{FriendshipRepository, RequestOutcome};
pub use notification::NotificationRepository;
pub use presence::PresenceRepository;
pub use privacy::PrivacySettingsRepository;
pub use report::ReportRepository;

use dexsocial_common::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize a raw store array into typed records, rejecting malformed
/// rows rather than silently dropping them.
pub(crate) fn decode_rows<T: DeserializeOwned>(key: &str, rows: Vec<Value>) -> AppResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| AppError::Storage(format!("Malformed row in {key}: {e}")))
        })
        .collect()
}

/// Serialize typed records back into a raw store array.
pub(crate) fn encode_rows<T: Serialize>(key: &str, rows: &[T]) -> AppResult<Vec<Value>> {
    rows.iter()
        .map(|row| {
            serde_json::to_value(row)
                .map_err(|e| AppError::Storage(format!("Failed to encode row for {key}: {e}")))
        })
        .collect()
}
