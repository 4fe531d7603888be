//! Friend search endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::FriendCandidateView;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFriendsRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_limit() -> usize {
    20
}

/// Ranked friend candidates matching the query.
async fn search_friends(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SearchFriendsRequest>,
) -> AppResult<ApiResponse<Vec<FriendCandidateView>>> {
    let limit = req.limit.clamp(1, 50);
    let results = state
        .search_service
        .search(&user.id, &req.query, limit)
        .await?;
    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/friends", post(search_friends))
}
