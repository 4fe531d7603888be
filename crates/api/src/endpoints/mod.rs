//! API endpoints.

mod blocking;
mod feed;
mod friendships;
mod notifications;
mod presence;
mod reports;
mod search;
mod settings;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/friendships", friendships::router())
        .nest("/blocking", blocking::router())
        .nest("/presence", presence::router())
        .nest("/settings", settings::router())
        .nest("/feed", feed::router())
        .nest("/notifications", notifications::router())
        .nest("/reports", reports::router())
        .nest("/search", search::router())
}
