//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for auth, sessions, and security alerts
//! - Authentication middleware with session heartbeat
//! - The geolocation lookup and notification dispatcher collaborators

pub mod geo;
pub mod middleware;
pub mod notify;
pub mod respond;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use civitrack_core::alert::NotificationDispatcher;
use civitrack_core::fingerprint::GeoLookup;
use civitrack_shared::config::SecurityConfig;
use civitrack_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Geolocation lookup collaborator.
    pub geo: Arc<dyn GeoLookup>,
    /// Notification hand-off collaborator.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    /// Session and alert lifecycle settings.
    pub security: SecurityConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
