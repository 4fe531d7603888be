//! Activity feed endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::SocialActivityView;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, PageResponse},
};

/// List feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFeedRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub cursor: Option<String>,
}

const fn default_limit() -> usize {
    20
}

/// One page of the caller's feed.
async fn list_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListFeedRequest>,
) -> AppResult<ApiResponse<PageResponse<SocialActivityView>>> {
    let limit = req.limit.clamp(1, 100);
    let page = state
        .feed_service
        .list_for_viewer(&user.id, req.cursor.as_deref(), limit)
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/list", post(list_feed))
}
