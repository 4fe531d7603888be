//! API integration tests.
//!
//! These tests drive the real router against an in-memory store and
//! directory, end to end through the auth middleware.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use dexsocial_api::{middleware::AppState, middleware::auth_middleware, router as api_router};
use dexsocial_core::directory::{MemoryDirectory, UserDirectory, test_user};
use dexsocial_core::{
    FeedService, FriendSearchService, ModerationService, NotificationService, PresenceService,
    SocialService,
};
use dexsocial_store::document::{DocumentStore, MemoryStore};
use dexsocial_store::repositories::{
    ActivityRepository, BlockRepository, FriendshipRepository, NotificationRepository,
    PresenceRepository, PrivacySettingsRepository, ReportRepository,
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Create test app state over an in-memory store.
async fn create_test_state() -> AppState {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let directory = MemoryDirectory::shared();
    for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
        directory.insert_user(test_user(id, name)).await;
    }
    let directory: Arc<dyn UserDirectory> = directory;

    let friendship_repo = FriendshipRepository::new(store.clone());
    let block_repo = BlockRepository::new(store.clone());
    let privacy_repo = PrivacySettingsRepository::new(store.clone());
    let activity_repo = ActivityRepository::new(store.clone());
    let notification_repo = NotificationRepository::new(store.clone());
    let presence_repo = PresenceRepository::new(store.clone());
    let report_repo = ReportRepository::new(store.clone());

    let notification_service = NotificationService::new(notification_repo, directory.clone());
    let presence_service = PresenceService::new(
        presence_repo,
        privacy_repo.clone(),
        friendship_repo.clone(),
        block_repo.clone(),
    );
    let social_service = SocialService::new(
        friendship_repo.clone(),
        block_repo.clone(),
        privacy_repo,
        activity_repo.clone(),
        notification_service.clone(),
        presence_service.clone(),
        directory.clone(),
    );
    let feed_service = FeedService::new(
        activity_repo,
        friendship_repo,
        block_repo.clone(),
        directory.clone(),
    );
    let moderation_service = ModerationService::new(
        report_repo,
        notification_service.clone(),
        directory.clone(),
    );
    let search_service = FriendSearchService::new(directory.clone(), block_repo);

    AppState {
        social_service,
        feed_service,
        notification_service,
        presence_service,
        moderation_service,
        search_service,
        directory,
    }
}

async fn create_test_router() -> Router {
    let state = create_test_state().await;
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn request(user: Option<&str>, uri: &str, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json");
    if let Some(user) = user {
        builder = builder.header("Authorization", format!("Bearer {user}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_bearer_token_is_unauthorized() {
    let app = create_test_router().await;
    let response = app
        .oneshot(request(None, "/friendships/list", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_bearer_token_is_unauthorized() {
    let app = create_test_router().await;
    let response = app
        .oneshot(request(Some("ghost"), "/friendships/list", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router().await;
    let response = app
        .oneshot(request(Some("alice"), "/nonexistent/endpoint", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_friendship_request_accept_flow() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Some("alice"),
            "/friendships/request",
            json!({"userId": "bob"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["outcome"], "request_sent");
    assert_eq!(body["data"]["status"], "pending");
    let relation_id = body["data"]["id"].as_str().unwrap().to_string();

    // Bob sees the incoming request and one unread notification.
    let response = app
        .clone()
        .oneshot(request(Some("bob"), "/friendships/list", json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["incoming"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request(Some("bob"), "/notifications/unread-count", json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["count"], 1);

    // Bob accepts; both sides now show friends.
    let response = app
        .clone()
        .oneshot(request(
            Some("bob"),
            "/friendships/accept",
            json!({"relationId": relation_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "accepted");

    let response = app
        .clone()
        .oneshot(request(
            Some("alice"),
            "/friendships/show",
            json!({"userId": "bob"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "friends");
}

#[tokio::test]
async fn test_accepting_foreign_relation_is_forbidden() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Some("alice"),
            "/friendships/request",
            json!({"userId": "bob"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let relation_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(request(
            Some("carol"),
            "/friendships/accept",
            json!({"relationId": relation_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_block_gates_friend_request() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Some("bob"),
            "/blocking/create",
            json!({"userId": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            Some("alice"),
            "/friendships/request",
            json!({"userId": "bob"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The blocker sees blocked_by_you, the blocked side sees blocked_you.
    let response = app
        .clone()
        .oneshot(request(Some("bob"), "/friendships/show", json!({"userId": "alice"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "blocked_by_you");

    let response = app
        .oneshot(request(Some("alice"), "/friendships/show", json!({"userId": "bob"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "blocked_you");
}

#[tokio::test]
async fn test_presence_touch_and_policy() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(request(Some("bob"), "/presence/touch", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Default policy is friends-only; a stranger sees hidden.
    let response = app
        .clone()
        .oneshot(request(Some("alice"), "/presence/show", json!({"userId": "bob"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], "hidden");

    // Opening visibility makes the heartbeat visible.
    let response = app
        .clone()
        .oneshot(request(
            Some("bob"),
            "/settings/update",
            json!({"friendRequestPolicy": "everyone", "presenceVisibility": "everyone"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(Some("alice"), "/presence/show", json!({"userId": "bob"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], "online");
}

#[tokio::test]
async fn test_feed_lists_friend_activity() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(request(Some("alice"), "/friendships/request", json!({"userId": "bob"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    let relation_id = body["data"]["id"].as_str().unwrap().to_string();
    app.clone()
        .oneshot(request(Some("bob"), "/friendships/accept", json!({"relationId": relation_id})))
        .await
        .unwrap();

    let response = app
        .oneshot(request(Some("alice"), "/feed/list", json!({"limit": 10})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let items = body["data"]["items"].as_array().unwrap();
    // Request and acceptance rows, both between visible parties.
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "friend_request_accepted");
    assert_eq!(items[1]["kind"], "friend_request_sent");
}

#[tokio::test]
async fn test_report_lifecycle() {
    let app = create_test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Some("alice"),
            "/reports/create",
            json!({"userId": "bob", "reason": "spam", "notes": "junk links"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "open");
    let report_id = body["data"]["reportId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            Some("carol"),
            "/reports/review",
            json!({"reportId": report_id, "status": "resolved", "notes": "handled"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "resolved");
    assert_eq!(body["data"]["reviewedByUserId"], "carol");

    let response = app
        .oneshot(request(Some("carol"), "/reports/list", json!({"status": "open"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_ranks_prefix_matches() {
    let app = create_test_router().await;

    let response = app
        .oneshot(request(Some("carol"), "/search/friends", json!({"query": "ali"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["userId"], "alice");
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let app = create_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/friendships/request")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer alice")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}
