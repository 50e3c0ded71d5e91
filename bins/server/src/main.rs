//! CiviTrack API Server
//!
//! Main entry point for the CiviTrack backend service.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civitrack_api::geo::IpApiClient;
use civitrack_api::notify::LoggingDispatcher;
use civitrack_api::{AppState, create_router};
use civitrack_db::{AlertRepository, SessionRepository, connect};
use civitrack_shared::config::SecurityConfig;
use civitrack_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civitrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
        #[allow(clippy::cast_possible_wrap)]
        refresh_token_expires_days: (config.jwt.refresh_token_expiry_secs / 86400) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create the geolocation client
    let geo = IpApiClient::new(&config.geo)?;
    info!(endpoint = %config.geo.endpoint, "Geolocation lookup configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db.clone()),
        jwt_service: Arc::new(jwt_service),
        geo: Arc::new(geo),
        dispatcher: Arc::new(LoggingDispatcher),
        security: config.security.clone(),
    };

    // Periodic session and alert maintenance
    tokio::spawn(maintenance_sweep(db, config.security.clone()));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically removes expired sessions, stale inactive sessions, and
/// acknowledged alerts past their retention window.
async fn maintenance_sweep(db: DatabaseConnection, security: SecurityConfig) {
    let session_repo = SessionRepository::new(db.clone());
    let alert_repo = AlertRepository::new(db);
    let mut ticker = tokio::time::interval(Duration::from_secs(security.sweep_interval_secs));

    loop {
        ticker.tick().await;

        match session_repo
            .cleanup_expired(chrono::Duration::days(security.inactive_retention_days))
            .await
        {
            Ok(removed) if removed > 0 => info!(removed, "Removed stale sessions"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Session cleanup sweep failed"),
        }

        match alert_repo
            .purge_old(Some(security.alert_retention_days))
            .await
        {
            Ok(purged) if purged > 0 => info!(purged, "Purged old alerts"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Alert purge sweep failed"),
        }
    }
}
