//! Notification endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::SocialNotificationView;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, PageResponse},
};

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub cursor: Option<String>,
    #[serde(default)]
    pub unread_only: bool,
}

const fn default_limit() -> usize {
    30
}

/// Request naming one notification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub notification_id: String,
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: usize,
}

/// Mark-all response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub marked: usize,
}

/// One page of the caller's inbox.
async fn list_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<PageResponse<SocialNotificationView>>> {
    let limit = req.limit.clamp(1, 100);
    let page = state
        .notification_service
        .list(&user.id, req.unread_only, req.cursor.as_deref(), limit)
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

/// Mark one notification read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .mark_read(&user.id, &req.notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Mark every notification of the caller read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllReadResponse>> {
    let marked = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(MarkAllReadResponse { marked }))
}

/// Count unread notifications.
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.count_unread(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

/// Delete one notification.
async fn delete_notification(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .delete(&user.id, &req.notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list_notifications))
        .route("/mark-read", post(mark_read))
        .route("/mark-all-read", post(mark_all_read))
        .route("/unread-count", post(unread_count))
        .route("/delete", post(delete_notification))
}
