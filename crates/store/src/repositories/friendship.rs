//! Friendship repository: the pairwise state machine.
//!
//! Per unordered pair:
//!
//! ```text
//! (no record) --request(A->B)--> pending(requested_by=A)
//! pending(requested_by=A) --request(B->A)--> accepted   (reciprocal request = acceptance)
//! pending(requested_by=A) --accept(by B)-->  accepted
//! pending(requested_by=A) --reject(by B)-->  (deleted)
//! pending(requested_by=A) --cancel(by A)-->  (deleted)
//! accepted --remove(by A or B)-->            (deleted)
//! ```

use std::sync::Arc;

use chrono::Utc;
use dexsocial_common::{AppError, AppResult};
use tokio::sync::Mutex;

use crate::document::DocumentStore;
use crate::records::{FriendshipRecord, FriendshipStatus, build_friendship_id};
use crate::repositories::{decode_rows, encode_rows};

const STORE_KEY: &str = "social_friendships";

/// What a `request_friendship` call actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A fresh pending record was created.
    RequestSent,
    /// The target had already requested; the reciprocal request accepted it.
    AutoAccepted,
    /// The requester already has an outgoing pending request; no change.
    AlreadyPending,
    /// The pair is already accepted; no change.
    AlreadyFriends,
}

/// Friendship repository for document store operations.
#[derive(Clone)]
pub struct FriendshipRepository {
    store: Arc<dyn DocumentStore>,
    write_guard: Arc<Mutex<()>>,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    async fn read_all(&self) -> AppResult<Vec<FriendshipRecord>> {
        let rows = self.store.read_array(STORE_KEY).await?;
        let records: Vec<FriendshipRecord> = decode_rows(STORE_KEY, rows)?;
        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }

    async fn write_all(&self, records: &[FriendshipRecord]) -> AppResult<()> {
        let rows = encode_rows(STORE_KEY, records)?;
        self.store.write_array(STORE_KEY, rows).await
    }

    /// Request a friendship from `requester` to `target`.
    ///
    /// Creates a pending record, or accepts an existing pending record
    /// addressed to the requester (reciprocal request). Requesting an
    /// already-pending or already-accepted pair is a no-op returning the
    /// existing record.
    pub async fn request_friendship(
        &self,
        requester: &str,
        target: &str,
    ) -> AppResult<(FriendshipRecord, RequestOutcome)> {
        if requester == target {
            return Err(AppError::BadRequest(
                "Cannot friend yourself".to_string(),
            ));
        }

        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let id = build_friendship_id(requester, target);
        let now = Utc::now();

        if let Some(pos) = records.iter().position(|r| r.id == id) {
            let record = &mut records[pos];
            let outcome = match record.status {
                FriendshipStatus::Accepted => return Ok((record.clone(), RequestOutcome::AlreadyFriends)),
                FriendshipStatus::Pending if record.requested_by == requester => {
                    return Ok((record.clone(), RequestOutcome::AlreadyPending));
                }
                FriendshipStatus::Pending => {
                    // The other party asked first; this request answers it.
                    record.status = FriendshipStatus::Accepted;
                    record.accepted_at = Some(now);
                    record.updated_at = now;
                    RequestOutcome::AutoAccepted
                }
            };
            let record = records[pos].clone();
            self.write_all(&records).await?;
            return Ok((record, outcome));
        }

        let record = FriendshipRecord::new_pending(requester, target, now);
        records.push(record.clone());
        self.write_all(&records).await?;
        Ok((record, RequestOutcome::RequestSent))
    }

    /// Accept a pending request addressed to `actor`.
    pub async fn accept_incoming(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let pos = Self::position_of(&records, relation_id)?;

        if !records[pos].involves(actor) {
            return Err(AppError::Forbidden(
                "Relation does not belong to you".to_string(),
            ));
        }
        if !records[pos].is_incoming_pending(actor) {
            return Err(AppError::BadRequest(
                "Only the recipient of a pending request can accept it".to_string(),
            ));
        }

        let now = Utc::now();
        records[pos].status = FriendshipStatus::Accepted;
        records[pos].accepted_at = Some(now);
        records[pos].updated_at = now;
        let record = records[pos].clone();
        self.write_all(&records).await?;
        Ok(record)
    }

    /// Reject a pending request addressed to `actor`. The record is hard
    /// deleted; the deleted record is returned so callers know the pair.
    pub async fn reject_incoming(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let pos = Self::position_of(&records, relation_id)?;

        if !records[pos].involves(actor) {
            return Err(AppError::Forbidden(
                "Relation does not belong to you".to_string(),
            ));
        }
        if !records[pos].is_incoming_pending(actor) {
            return Err(AppError::BadRequest(
                "Only the recipient of a pending request can reject it".to_string(),
            ));
        }

        let record = records.remove(pos);
        self.write_all(&records).await?;
        Ok(record)
    }

    /// Cancel a pending request initiated by `actor`.
    pub async fn cancel_outgoing(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let pos = Self::position_of(&records, relation_id)?;

        if !records[pos].involves(actor) {
            return Err(AppError::Forbidden(
                "Relation does not belong to you".to_string(),
            ));
        }
        if !records[pos].is_outgoing_pending(actor) {
            return Err(AppError::BadRequest(
                "Only the requester can cancel a pending request".to_string(),
            ));
        }

        let record = records.remove(pos);
        self.write_all(&records).await?;
        Ok(record)
    }

    /// Remove an accepted friendship `actor` is a party of.
    pub async fn remove_accepted(
        &self,
        actor: &str,
        relation_id: &str,
    ) -> AppResult<FriendshipRecord> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let pos = Self::position_of(&records, relation_id)?;

        if !records[pos].involves(actor) {
            return Err(AppError::Forbidden(
                "Relation does not belong to you".to_string(),
            ));
        }
        if records[pos].status != FriendshipStatus::Accepted {
            return Err(AppError::BadRequest(
                "Only an accepted friendship can be removed".to_string(),
            ));
        }

        let record = records.remove(pos);
        self.write_all(&records).await?;
        Ok(record)
    }

    /// Delete whatever record exists between a pair, regardless of status.
    /// Used by the block fan-out.
    pub async fn delete_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> AppResult<Option<FriendshipRecord>> {
        let _guard = self.write_guard.lock().await;
        let mut records = self.read_all().await?;
        let id = build_friendship_id(user_a, user_b);

        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let record = records.remove(pos);
        self.write_all(&records).await?;
        Ok(Some(record))
    }

    /// Find a record by relation id.
    pub async fn get_by_id(&self, relation_id: &str) -> AppResult<Option<FriendshipRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.id == relation_id))
    }

    /// Find the record between a pair, in either argument order.
    pub async fn get_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> AppResult<Option<FriendshipRecord>> {
        self.get_by_id(&build_friendship_id(user_a, user_b)).await
    }

    /// All records a user is a party of, any status.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<FriendshipRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().filter(|r| r.involves(user_id)).collect())
    }

    /// Accepted records a user is a party of.
    pub async fn list_accepted_for_user(&self, user_id: &str) -> AppResult<Vec<FriendshipRecord>> {
        let records = self.read_all().await?;
        Ok(records
            .into_iter()
            .filter(|r| r.involves(user_id) && r.status == FriendshipStatus::Accepted)
            .collect())
    }

    fn position_of(records: &[FriendshipRecord], relation_id: &str) -> AppResult<usize> {
        records
            .iter()
            .position(|r| r.id == relation_id)
            .ok_or_else(|| AppError::NotFound(format!("Relation not found: {relation_id}")))
    }
}
