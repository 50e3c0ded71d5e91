//! Session management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::respond::{error_response, internal_error};
use civitrack_shared::AppError;
use civitrack_core::alert::{AlertMetadata, AlertType};
use civitrack_db::entities::sessions;
use civitrack_db::repositories::{NewAlert, RevokeOutcome};
use civitrack_db::{AlertRepository, SessionRepository};

/// Creates the sessions router. All routes require authentication.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/stats", get(session_stats))
        .route("/sessions/revoke-all", post(revoke_all))
        .route("/sessions/{id}", delete(revoke_session))
}

/// A session as presented to its owner.
#[derive(Debug, Serialize)]
struct SessionView {
    id: Uuid,
    device_type: String,
    device_os: String,
    device_app: String,
    ip_address: String,
    city: String,
    country: String,
    risk_score: i16,
    risk_level: String,
    requires_verification: bool,
    login_method: String,
    is_current: bool,
    created_at: DateTimeWithTimeZone,
    last_active_at: DateTimeWithTimeZone,
    expires_at: DateTimeWithTimeZone,
}

impl SessionView {
    fn from_model(session: sessions::Model, current_session_id: Uuid) -> Self {
        Self {
            is_current: session.id == current_session_id,
            id: session.id,
            device_type: session.device_type,
            device_os: session.device_os,
            device_app: session.device_app,
            ip_address: session.ip_address,
            city: session.city,
            country: session.country,
            risk_score: session.risk_score,
            risk_level: session.risk_level,
            requires_verification: session.requires_verification,
            login_method: session.login_method,
            created_at: session.created_at,
            last_active_at: session.last_active_at,
            expires_at: session.expires_at,
        }
    }
}

/// GET /sessions - List the caller's active sessions, newest activity first.
async fn list_sessions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.list_active(auth.user_id()).await {
        Ok(sessions) => {
            let current = auth.session_id();
            let views: Vec<SessionView> = sessions
                .into_iter()
                .map(|s| SessionView::from_model(s, current))
                .collect();
            (StatusCode::OK, Json(json!({ "sessions": views }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list sessions");
            internal_error("Failed to list sessions")
        }
    }
}

/// DELETE /sessions/{id} - Revoke one of the caller's other sessions.
async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    // The current session ends through logout, not through revocation;
    // rejecting it here keeps the two paths distinct.
    if session_id == auth.session_id() {
        return error_response(&AppError::InvalidOperation(
            "the current session cannot revoke itself; use logout".to_string(),
        ));
    }

    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.revoke(session_id, auth.user_id()).await {
        Ok(RevokeOutcome::Revoked) => {
            info!(user_id = %auth.user_id(), %session_id, "Session revoked");

            let alert_repo = AlertRepository::new((*state.db).clone())
                .with_dispatcher(state.dispatcher.clone());
            let result = alert_repo
                .raise(NewAlert {
                    user_id: auth.user_id(),
                    session_id: Some(session_id),
                    alert_type: AlertType::SessionRevoked,
                    severity: None,
                    title: "Session revoked".to_string(),
                    description: "One of your sessions was signed out remotely.".to_string(),
                    metadata: AlertMetadata::SessionRevoked {
                        session_id,
                        reason: None,
                    },
                })
                .await;
            if let Err(e) = result {
                warn!(error = %e, %session_id, "Failed to raise revocation alert");
            }

            (
                StatusCode::OK,
                Json(json!({ "message": "Session revoked" })),
            )
                .into_response()
        }
        Ok(RevokeOutcome::AlreadyInactive) => (
            StatusCode::OK,
            Json(json!({ "message": "Session was already revoked" })),
        )
            .into_response(),
        Ok(RevokeOutcome::NotFound) => {
            error_response(&AppError::NotFound("no such session".to_string()))
        }
        Err(e) => {
            error!(error = %e, "Failed to revoke session");
            internal_error("Failed to revoke session")
        }
    }
}

/// POST /sessions/revoke-all - Revoke every session except the current one.
async fn revoke_all(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    let revoked = match session_repo
        .revoke_all_except(auth.user_id(), auth.session_id())
        .await
    {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Failed to revoke sessions");
            return internal_error("Failed to revoke sessions");
        }
    };

    info!(user_id = %auth.user_id(), revoked, "Bulk session revocation");

    // One aggregate alert regardless of how many sessions went.
    if revoked > 0 {
        let alert_repo =
            AlertRepository::new((*state.db).clone()).with_dispatcher(state.dispatcher.clone());
        let result = alert_repo
            .raise(NewAlert {
                user_id: auth.user_id(),
                session_id: Some(auth.session_id()),
                alert_type: AlertType::AllSessionsRevoked,
                severity: None,
                title: "All other sessions revoked".to_string(),
                description: format!(
                    "{revoked} session(s) were signed out everywhere except this device."
                ),
                metadata: AlertMetadata::BulkRevocation {
                    revoked_count: revoked,
                },
            })
            .await;
        if let Err(e) = result {
            warn!(error = %e, "Failed to raise bulk revocation alert");
        }
    }

    (StatusCode::OK, Json(json!({ "revoked_count": revoked }))).into_response()
}

/// GET /sessions/stats - Aggregate session security statistics.
async fn session_stats(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.security_stats(auth.user_id()).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to aggregate session stats");
            internal_error("Failed to aggregate session stats")
        }
    }
}

