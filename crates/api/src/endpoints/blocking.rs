//! Blocking endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::SocialUserSummary;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Block user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockUserRequest {
    pub user_id: String,
}

/// Unblock user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblockUserRequest {
    pub user_id: String,
}

/// Block a user.
async fn block_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlockUserRequest>,
) -> AppResult<ApiResponse<()>> {
    state.social_service.block_user(&user.id, &req.user_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Unblock a user.
async fn unblock_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnblockUserRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .social_service
        .unblock_user(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Get list of blocked users.
async fn list_blocking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SocialUserSummary>>> {
    let blocked = state.social_service.list_blocked(&user.id).await?;
    Ok(ApiResponse::ok(blocked))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(block_user))
        .route("/delete", post(unblock_user))
        .route("/list", post(list_blocking))
}
