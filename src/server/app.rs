//! Axum application setup
//!
//! Creates and configures the Axum application with routes and middleware.

use crate::{config::Settings, session::SessionRegistry};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry of live automation sessions
    pub registry: Arc<SessionRegistry>,
    /// Application settings
    pub settings: Arc<Settings>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

/// Create the main Axum application with routes and middleware
pub fn create_app(settings: Settings) -> Router {
    let registry = Arc::new(SessionRegistry::new(settings.clone()));
    create_app_with_registry(registry, settings)
}

/// Create the application around an existing registry; the binary shares
/// the registry with the expiry sweeper
pub fn create_app_with_registry(registry: Arc<SessionRegistry>, settings: Settings) -> Router {
    let state = AppState {
        registry,
        settings: Arc::new(settings),
        start_time: std::time::Instant::now(),
    };

    Router::new()
        .route("/api/messenger/login", post(super::handlers::login))
        .route(
            "/api/messenger/{token}/confirmLogin",
            post(super::handlers::confirm_login),
        )
        .route(
            "/api/messenger/{token}/status",
            get(super::handlers::status),
        )
        .route(
            "/api/messenger/{token}/send",
            post(super::handlers::send_message),
        )
        .route(
            "/api/messenger/{token}/keepAlive",
            get(super::handlers::keep_alive),
        )
        .route("/ping", get(super::handlers::ping))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
