//! HTTP API layer for dexsocial.
//!
//! This crate provides the REST surface of the social engine:
//!
//! - **Endpoints**: POST-only JSON endpoints under `/api`
//! - **Extractors**: Authentication from request extensions
//! - **Middleware**: Bearer-token resolution against the user directory
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
