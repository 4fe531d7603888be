//! dexsocial server entry point.
//!
//! Standalone wiring of the social engine over the configured document
//! store. In production the engine is embedded by the host application,
//! which supplies its own `UserDirectory`; this binary wires the
//! in-memory directory with demo users so the API can be exercised
//! directly.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use dexsocial_api::{middleware::AppState, router as api_router};
use dexsocial_common::config::StoreBackend;
use dexsocial_common::Config;
use dexsocial_core::directory::{MemoryDirectory, UserDirectory, test_user};
use dexsocial_core::{
    FeedService, FriendSearchService, ModerationService, NotificationService, PresenceService,
    SocialService,
};
use dexsocial_store::document::{DocumentStore, LocalStore, MemoryStore};
use dexsocial_store::repositories::{
    ActivityRepository, BlockRepository, FriendshipRepository, NotificationRepository,
    PresenceRepository, PrivacySettingsRepository, ReportRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

async fn seed_demo_directory() -> Arc<MemoryDirectory> {
    let directory = MemoryDirectory::shared();
    for (id, name) in [("ash", "Ash"), ("misty", "Misty"), ("brock", "Brock")] {
        directory.insert_user(test_user(id, name)).await;
    }
    directory
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dexsocial=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting dexsocial server...");

    // Load configuration
    let config = Config::load()?;

    // Open the document store
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Local => {
            info!(dir = %config.store.data_dir.display(), "Using local document store");
            Arc::new(LocalStore::new(config.store.data_dir.clone()))
        }
    };

    let directory: Arc<dyn UserDirectory> = seed_demo_directory().await;

    // Initialize repositories
    let friendship_repo = FriendshipRepository::new(store.clone());
    let block_repo = BlockRepository::new(store.clone());
    let privacy_repo = PrivacySettingsRepository::new(store.clone());
    let activity_repo = ActivityRepository::new(store.clone());
    let notification_repo = NotificationRepository::new(store.clone());
    let presence_repo = PresenceRepository::new(store.clone());
    let report_repo = ReportRepository::new(store);

    // Initialize services
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

    let state = AppState {
        social_service,
        feed_service,
        notification_service,
        presence_service,
        moderation_service,
        search_service,
        directory,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            dexsocial_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
