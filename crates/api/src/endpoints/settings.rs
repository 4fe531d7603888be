//! Privacy settings endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_store::records::{
    FriendRequestPolicy, PresenceVisibility, SocialPrivacySettingsRecord,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Update settings request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub friend_request_policy: FriendRequestPolicy,
    pub presence_visibility: PresenceVisibility,
}

/// Settings response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub friend_request_policy: FriendRequestPolicy,
    pub presence_visibility: PresenceVisibility,
    pub updated_at: String,
}

impl From<SocialPrivacySettingsRecord> for SettingsResponse {
    fn from(record: SocialPrivacySettingsRecord) -> Self {
        Self {
            friend_request_policy: record.friend_request_policy,
            presence_visibility: record.presence_visibility,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// The caller's privacy settings, defaulted when never saved.
async fn show_settings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SettingsResponse>> {
    let settings = state.social_service.get_settings(&user.id).await?;
    Ok(ApiResponse::ok(settings.into()))
}

/// Replace the caller's privacy settings.
async fn update_settings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> AppResult<ApiResponse<SettingsResponse>> {
    let settings = state
        .social_service
        .update_settings(&user.id, req.friend_request_policy, req.presence_visibility)
        .await?;
    Ok(ApiResponse::ok(settings.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show_settings))
        .route("/update", post(update_settings))
}
