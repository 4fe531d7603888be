//! Moderation report endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dexsocial_common::AppResult;
use dexsocial_core::views::SocialReportAdminView;
use dexsocial_store::records::{ReportReason, ReportStatus};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, PageResponse},
};

/// Create report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub user_id: String,
    pub reason: ReportReason,
    pub notes: Option<String>,
}

/// List reports request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsRequest {
    pub status: Option<ReportStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub cursor: Option<String>,
}

const fn default_limit() -> usize {
    30
}

/// Show report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowReportRequest {
    pub report_id: String,
}

/// Create report response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportResponse {
    pub report_id: String,
    pub status: ReportStatus,
}

/// Review report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportRequest {
    pub report_id: String,
    pub status: ReportStatus,
    pub notes: Option<String>,
}

/// File a report against another user.
async fn create_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<ApiResponse<CreateReportResponse>> {
    let record = state
        .moderation_service
        .submit_report(&user.id, &req.user_id, req.reason, req.notes)
        .await?;
    Ok(ApiResponse::ok(CreateReportResponse {
        report_id: record.id,
        status: record.status,
    }))
}

/// One page of reports for the moderation dashboard.
async fn list_reports(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListReportsRequest>,
) -> AppResult<ApiResponse<PageResponse<SocialReportAdminView>>> {
    let limit = req.limit.clamp(1, 100);
    let page = state
        .moderation_service
        .list_reports(req.status, req.cursor.as_deref(), limit)
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

/// One report by id.
async fn show_report(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowReportRequest>,
) -> AppResult<ApiResponse<SocialReportAdminView>> {
    let view = state.moderation_service.get_report(&req.report_id).await?;
    Ok(ApiResponse::ok(view))
}

/// Record a review decision.
async fn review_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewReportRequest>,
) -> AppResult<ApiResponse<SocialReportAdminView>> {
    let view = state
        .moderation_service
        .review_report(&user.id, &req.report_id, req.status, req.notes)
        .await?;
    Ok(ApiResponse::ok(view))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_report))
        .route("/list", post(list_reports))
        .route("/show", post(show_report))
        .route("/review", post(review_report))
}
