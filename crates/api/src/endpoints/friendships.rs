//! Friendship endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::{FriendNetworkSnapshot, FriendshipRelationView};
use dexsocial_store::records::{FriendshipRecord, FriendshipStatus};
use dexsocial_store::repositories::RequestOutcome;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Friend request request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFriendshipRequest {
    pub user_id: String,
}

/// Request naming an existing relation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRequest {
    pub relation_id: String,
}

/// Show relation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRelationRequest {
    pub user_id: String,
}

/// Friendship response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipResponse {
    pub id: String,
    pub status: FriendshipStatus,
    pub requested_by: String,
    pub created_at: String,
    pub accepted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
}

impl FriendshipResponse {
    fn from_record(record: FriendshipRecord, outcome: Option<RequestOutcome>) -> Self {
        Self {
            id: record.id,
            status: record.status,
            requested_by: record.requested_by,
            created_at: record.created_at.to_rfc3339(),
            accepted_at: record.accepted_at.map(|t| t.to_rfc3339()),
            outcome: outcome.map(|o| match o {
                RequestOutcome::RequestSent => "request_sent",
                RequestOutcome::AutoAccepted => "auto_accepted",
                RequestOutcome::AlreadyPending => "already_pending",
                RequestOutcome::AlreadyFriends => "already_friends",
            }),
        }
    }
}

/// Send a friend request.
async fn request_friendship(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RequestFriendshipRequest>,
) -> AppResult<ApiResponse<FriendshipResponse>> {
    let (record, outcome) = state
        .social_service
        .request_friendship(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(FriendshipResponse::from_record(
        record,
        Some(outcome),
    )))
}

/// Accept a pending friend request.
async fn accept_friendship(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RelationRequest>,
) -> AppResult<ApiResponse<FriendshipResponse>> {
    let record = state
        .social_service
        .accept_friendship(&user.id, &req.relation_id)
        .await?;
    Ok(ApiResponse::ok(FriendshipResponse::from_record(record, None)))
}

/// Reject a pending friend request.
async fn reject_friendship(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RelationRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .social_service
        .reject_friendship(&user.id, &req.relation_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Cancel an outgoing friend request.
async fn cancel_friendship(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RelationRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .social_service
        .cancel_friendship_request(&user.id, &req.relation_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Remove an accepted friendship.
async fn remove_friendship(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RelationRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .social_service
        .remove_friendship(&user.id, &req.relation_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Friends and pending requests of the caller.
async fn list_network(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<FriendNetworkSnapshot>> {
    let snapshot = state.social_service.network_snapshot(&user.id).await?;
    Ok(ApiResponse::ok(snapshot))
}

/// Relation between the caller and another user.
async fn show_relation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowRelationRequest>,
) -> AppResult<ApiResponse<FriendshipRelationView>> {
    let relation = state.social_service.relation_to(&user.id, &req.user_id).await?;
    Ok(ApiResponse::ok(relation))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(request_friendship))
        .route("/accept", post(accept_friendship))
        .route("/reject", post(reject_friendship))
        .route("/cancel", post(cancel_friendship))
        .route("/remove", post(remove_friendship))
        .route("/list", post(list_network))
        .route("/show", post(show_relation))
}
