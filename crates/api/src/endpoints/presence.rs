//! Presence endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::PresenceView;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Show presence request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPresenceRequest {
    pub user_id: String,
}

/// Touch response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchResponse {
    pub last_active_at: String,
}

/// Record a heartbeat for the caller.
async fn touch(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TouchResponse>> {
    let record = state.presence_service.touch(&user.id).await?;
    Ok(ApiResponse::ok(TouchResponse {
        last_active_at: record.last_active_at.to_rfc3339(),
    }))
}

/// Presence of another user as the caller sees it.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPresenceRequest>,
) -> AppResult<ApiResponse<PresenceView>> {
    let view = state
        .presence_service
        .resolve_for_viewer(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(view))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/touch", post(touch))
        .route("/show", post(show))
}
