//! API middleware.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use dexsocial_core::directory::UserDirectory;
use dexsocial_core::{
    FeedService, FriendSearchService, ModerationService, NotificationService, PresenceService,
    SocialService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub social_service: SocialService,
    pub feed_service: FeedService,
    pub notification_service: NotificationService,
    pub presence_service: PresenceService,
    pub moderation_service: ModerationService,
    pub search_service: FriendSearchService,
    pub directory: Arc<dyn UserDirectory>,
}

/// Authentication middleware.
///
/// The host application owns sessions; by the time a request reaches this
/// engine its bearer token has been exchanged for the session's user id.
/// Unknown or absent tokens leave the request anonymous and individual
/// extractors reject where auth is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(user_id) = auth_str.strip_prefix("Bearer ")
        && let Ok(Some(user)) = state.directory.find_user_by_id(user_id).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
