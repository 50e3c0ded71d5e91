//! Security alert routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::respond::{error_response, internal_error};
use civitrack_shared::AppError;
use civitrack_core::alert::{AlertMetadata, AlertSeverity, AlertStatus, AlertType};
use civitrack_db::AlertRepository;
use civitrack_db::repositories::{AlertFilter, NewAlert};
use civitrack_shared::types::PageRequest;

/// Creates the alerts router. All routes require authentication.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/stats", get(alert_stats))
        .route("/alerts/read-all", post(mark_all_read))
        .route("/alerts/report", post(report_suspicious))
        .route("/alerts/{id}/read", post(mark_read))
        .route("/alerts/{id}/dismiss", post(dismiss))
        .route("/alerts/{id}/resolve", post(resolve))
}

/// Query parameters for the alert list.
#[derive(Debug, Default, Deserialize)]
struct AlertListQuery {
    severity: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    alert_type: Option<String>,
    #[serde(default)]
    unread_only: bool,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl AlertListQuery {
    /// Parses the string filters into their closed enums.
    fn filter(&self) -> Result<AlertFilter, String> {
        let severity = self
            .severity
            .as_deref()
            .map(|s| {
                s.parse::<AlertSeverity>()
                    .map_err(|()| format!("unknown severity: {s}"))
            })
            .transpose()?;
        let status = self
            .status
            .as_deref()
            .map(|s| {
                s.parse::<AlertStatus>()
                    .map_err(|()| format!("unknown status: {s}"))
            })
            .transpose()?;
        let alert_type = self
            .alert_type
            .as_deref()
            .map(|s| {
                s.parse::<AlertType>()
                    .map_err(|()| format!("unknown alert type: {s}"))
            })
            .transpose()?;

        Ok(AlertFilter {
            severity,
            status,
            alert_type,
            unread_only: self.unread_only,
        })
    }

    fn page(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(default.page).max(1),
            per_page: self.per_page.unwrap_or(default.per_page).clamp(1, 100),
        }
    }
}

/// GET /alerts - List the caller's alerts, newest first.
async fn list_alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AlertListQuery>,
) -> impl IntoResponse {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(message) => return error_response(&AppError::Validation(message)),
    };

    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo
        .list_for_user(auth.user_id(), &filter, &query.page())
        .await
    {
        Ok((page, unread_count)) => (
            StatusCode::OK,
            Json(json!({
                "alerts": page.data,
                "meta": page.meta,
                "unread_count": unread_count,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list alerts");
            internal_error("Failed to list alerts")
        }
    }
}

/// Optional free-text notes on an alert action.
#[derive(Debug, Default, Deserialize)]
struct ActionRequest {
    notes: Option<String>,
}

/// POST /alerts/{id}/read - Mark an alert as read.
async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(alert_id): Path<Uuid>,
) -> impl IntoResponse {
    let alert_repo = AlertRepository::new((*state.db).clone());
    let outcome = alert_repo.mark_read(alert_id, auth.user_id()).await;
    action_response(outcome)
}

/// POST /alerts/{id}/dismiss - Dismiss an alert.
async fn dismiss(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(alert_id): Path<Uuid>,
    payload: Option<Json<ActionRequest>>,
) -> impl IntoResponse {
    let notes = payload.and_then(|Json(p)| p.notes);
    let alert_repo = AlertRepository::new((*state.db).clone());
    let outcome = alert_repo.dismiss(alert_id, auth.user_id(), notes).await;
    action_response(outcome)
}

/// POST /alerts/{id}/resolve - Resolve an alert.
async fn resolve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(alert_id): Path<Uuid>,
    payload: Option<Json<ActionRequest>>,
) -> impl IntoResponse {
    let notes = payload.and_then(|Json(p)| p.notes);
    let alert_repo = AlertRepository::new((*state.db).clone());
    let outcome = alert_repo.resolve(alert_id, auth.user_id(), notes).await;
    action_response(outcome)
}

/// Shared response mapping for single-alert actions.
fn action_response(
    outcome: Result<Option<civitrack_db::entities::security_alerts::Model>, sea_orm::DbErr>,
) -> axum::response::Response {
    match outcome {
        Ok(Some(alert)) => (StatusCode::OK, Json(alert)).into_response(),
        Ok(None) => error_response(&AppError::NotFound("no such alert".to_string())),
        Err(e) => {
            error!(error = %e, "Failed to update alert");
            internal_error("Failed to update alert")
        }
    }
}

/// Request body for bulk read marking.
#[derive(Debug, Default, Deserialize)]
struct MarkAllReadRequest {
    alert_ids: Option<Vec<Uuid>>,
}

/// POST /alerts/read-all - Mark unread alerts as read, optionally scoped
/// to a set of ids.
async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Option<Json<MarkAllReadRequest>>,
) -> impl IntoResponse {
    let alert_ids = payload.and_then(|Json(p)| p.alert_ids);
    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo
        .mark_all_read(auth.user_id(), alert_ids.as_deref())
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to mark alerts read");
            internal_error("Failed to mark alerts read")
        }
    }
}

/// Query parameters for alert statistics.
#[derive(Debug, Deserialize)]
struct StatsQuery {
    window_days: Option<i64>,
}

/// GET /alerts/stats - Aggregate alert statistics over a trailing window.
async fn alert_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let window_days = query.window_days.unwrap_or(30).clamp(1, 365);
    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo.stats(auth.user_id(), window_days).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to aggregate alert stats");
            internal_error("Failed to aggregate alert stats")
        }
    }
}

/// Request body for a user-filed suspicious-activity report.
#[derive(Debug, Default, Deserialize)]
struct ReportRequest {
    details: Option<String>,
}

/// POST /alerts/report - File a suspicious-activity report as an alert.
async fn report_suspicious(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Option<Json<ReportRequest>>,
) -> impl IntoResponse {
    let details = payload.and_then(|Json(p)| p.details);
    let alert_repo =
        AlertRepository::new((*state.db).clone()).with_dispatcher(state.dispatcher.clone());

    let result = alert_repo
        .raise(NewAlert {
            user_id: auth.user_id(),
            session_id: Some(auth.session_id()),
            alert_type: AlertType::UserReportedSuspicious,
            severity: None,
            title: "Suspicious activity reported".to_string(),
            description: "You reported suspicious activity on your account.".to_string(),
            metadata: AlertMetadata::UserReport { details },
        })
        .await;

    match result {
        Ok(alert) => {
            info!(user_id = %auth.user_id(), alert_id = %alert.id, "User reported suspicious activity");
            (StatusCode::CREATED, Json(alert)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to raise user report");
            internal_error("Failed to file the report")
        }
    }
}

