//! Security alert repository: raising, listing, acknowledgement, and
//! retention.
//!
//! The repository records notification fan-out as scheduling intent and
//! hands each channel to the configured [`NotificationDispatcher`];
//! delivery itself is out-of-band and never blocks the raising call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use civitrack_core::alert::{
    channels_for, AlertMetadata, AlertSeverity, AlertStatus, AlertType, NotificationDispatcher,
};
use civitrack_shared::types::{PageRequest, PageResponse};

use crate::entities::security_alerts;

/// Default alert retention window for the purge sweep.
const DEFAULT_RETENTION_DAYS: i64 = 90;

/// Days covered by the daily trend in [`AlertStats`].
const TREND_DAYS: i64 = 7;

/// Inputs for raising a security alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    /// User the alert belongs to.
    pub user_id: Uuid,
    /// Session the alert relates to, when there is one.
    pub session_id: Option<Uuid>,
    /// What happened.
    pub alert_type: AlertType,
    /// Severity override; defaults to the type's default severity.
    pub severity: Option<AlertSeverity>,
    /// Short human-readable title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Typed metadata attached to the alert.
    pub metadata: AlertMetadata,
}

/// Filters for listing a user's alerts. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// Only alerts of this severity.
    pub severity: Option<AlertSeverity>,
    /// Only alerts in this status.
    pub status: Option<AlertStatus>,
    /// Only alerts of this type.
    pub alert_type: Option<AlertType>,
    /// Shorthand for `status = unread`.
    pub unread_only: bool,
}

/// One day of the alert trend.
#[derive(Debug, Clone, Serialize)]
pub struct DailyAlertCount {
    /// The day, UTC.
    pub date: NaiveDate,
    /// Alerts raised on that day.
    pub count: u64,
}

/// Aggregated per-user alert statistics.
#[derive(Debug, Clone, Serialize)]
pub struct AlertStats {
    /// Alerts raised within the window.
    pub total: u64,
    /// Unread alerts within the window.
    pub unread: u64,
    /// Counts per severity, within the window.
    pub by_severity: BTreeMap<String, u64>,
    /// Counts per alert type, within the window.
    pub by_type: BTreeMap<String, u64>,
    /// Daily counts for the trailing seven days, oldest first.
    pub daily_trend: Vec<DailyAlertCount>,
}

/// Security alert repository: the alert sink.
#[derive(Clone)]
pub struct AlertRepository {
    db: DatabaseConnection,
    dispatcher: Option<Arc<dyn NotificationDispatcher>>,
}

impl AlertRepository {
    /// Creates an alert repository without a notification dispatcher.
    ///
    /// Alerts are still persisted with their scheduled channels; nothing
    /// is handed off for delivery.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            dispatcher: None,
        }
    }

    /// Attaches a notification dispatcher for channel hand-off.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Raises a security alert.
    ///
    /// The severity defaults from the alert type, the channel fan-out is
    /// derived from the severity and recorded as intent, and each channel
    /// is handed to the dispatcher after the row is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata serialization or the insert fails.
    pub async fn raise(&self, input: NewAlert) -> Result<security_alerts::Model, DbErr> {
        let severity = input
            .severity
            .unwrap_or_else(|| input.alert_type.default_severity());
        let channels = channels_for(severity);

        let metadata =
            serde_json::to_value(&input.metadata).map_err(|e| DbErr::Json(e.to_string()))?;
        let channels_json = json!(channels
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>());

        let alert = security_alerts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            session_id: Set(input.session_id),
            alert_type: Set(input.alert_type.as_str().to_string()),
            severity: Set(severity.as_str().to_string()),
            title: Set(input.title),
            description: Set(input.description),
            metadata: Set(metadata),
            channels_scheduled: Set(channels_json),
            status: Set(AlertStatus::Unread.as_str().to_string()),
            actions: Set(json!([])),
            read_at: Set(None),
            resolved_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let alert = alert.insert(&self.db).await?;

        info!(
            alert_id = %alert.id,
            user_id = %alert.user_id,
            alert_type = %alert.alert_type,
            severity = %alert.severity,
            "security alert raised"
        );

        if let Some(dispatcher) = &self.dispatcher {
            for channel in channels {
                dispatcher.schedule(channel, alert.id, alert.user_id).await;
            }
        }

        Ok(alert)
    }

    /// Lists a user's alerts newest first, with optional filters.
    ///
    /// Returns the requested page and the user's overall unread count,
    /// which ignores the filters.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: &AlertFilter,
        page: &PageRequest,
    ) -> Result<(PageResponse<security_alerts::Model>, u64), DbErr> {
        let mut query = security_alerts::Entity::find()
            .filter(security_alerts::Column::UserId.eq(user_id));

        if let Some(severity) = filter.severity {
            query = query.filter(security_alerts::Column::Severity.eq(severity.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(security_alerts::Column::Status.eq(status.as_str()));
        }
        if let Some(alert_type) = filter.alert_type {
            query = query.filter(security_alerts::Column::AlertType.eq(alert_type.as_str()));
        }
        if filter.unread_only {
            query = query
                .filter(security_alerts::Column::Status.eq(AlertStatus::Unread.as_str()));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(security_alerts::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let unread = self.unread_count(user_id).await?;

        Ok((
            PageResponse::new(items, page.page, page.per_page, total),
            unread,
        ))
    }

    /// Counts a user's unread alerts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, DbErr> {
        security_alerts::Entity::find()
            .filter(security_alerts::Column::UserId.eq(user_id))
            .filter(security_alerts::Column::Status.eq(AlertStatus::Unread.as_str()))
            .count(&self.db)
            .await
    }

    /// Marks an alert as read. Idempotent; the first read timestamp is
    /// kept on repeat calls.
    ///
    /// Returns `None` when no alert with that id belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query or update fails.
    pub async fn mark_read(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<security_alerts::Model>, DbErr> {
        self.apply_action(alert_id, user_id, AlertStatus::Read, None)
            .await
    }

    /// Dismisses an alert. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query or update fails.
    pub async fn dismiss(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        notes: Option<String>,
    ) -> Result<Option<security_alerts::Model>, DbErr> {
        self.apply_action(alert_id, user_id, AlertStatus::Dismissed, notes)
            .await
    }

    /// Resolves an alert. Idempotent; the first resolution timestamp is
    /// kept on repeat calls.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query or update fails.
    pub async fn resolve(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        notes: Option<String>,
    ) -> Result<Option<security_alerts::Model>, DbErr> {
        self.apply_action(alert_id, user_id, AlertStatus::Resolved, notes)
            .await
    }

    /// Marks a user's unread alerts as read in a single statement,
    /// optionally restricted to a set of alert ids. Returns the number of
    /// alerts updated.
    ///
    /// The bulk path does not append per-alert action records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_all_read(
        &self,
        user_id: Uuid,
        alert_ids: Option<&[Uuid]>,
    ) -> Result<u64, DbErr> {
        let mut update = security_alerts::Entity::update_many()
            .col_expr(
                security_alerts::Column::Status,
                Expr::value(AlertStatus::Read.as_str()),
            )
            .col_expr(security_alerts::Column::ReadAt, Expr::value(Utc::now()))
            .filter(security_alerts::Column::UserId.eq(user_id))
            .filter(security_alerts::Column::Status.eq(AlertStatus::Unread.as_str()));

        if let Some(ids) = alert_ids {
            update = update.filter(security_alerts::Column::Id.is_in(ids.iter().copied()));
        }

        let result = update.exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// Aggregates a user's alert statistics over the trailing window.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stats(&self, user_id: Uuid, window_days: i64) -> Result<AlertStats, DbErr> {
        let now = Utc::now();
        let since = now - Duration::days(window_days.max(1));

        let alerts = security_alerts::Entity::find()
            .filter(security_alerts::Column::UserId.eq(user_id))
            .filter(security_alerts::Column::CreatedAt.gte(since))
            .all(&self.db)
            .await?;

        let mut by_severity: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut unread = 0u64;
        let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();

        for alert in &alerts {
            *by_severity.entry(alert.severity.clone()).or_default() += 1;
            *by_type.entry(alert.alert_type.clone()).or_default() += 1;
            if alert.status == AlertStatus::Unread.as_str() {
                unread += 1;
            }
            let day = alert.created_at.with_timezone(&Utc).date_naive();
            *per_day.entry(day).or_default() += 1;
        }

        let today = now.date_naive();
        let daily_trend = (0..TREND_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_signed(Duration::days(back)))
            .map(|date| DailyAlertCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect();

        Ok(AlertStats {
            total: alerts.len() as u64,
            unread,
            by_severity,
            by_type,
            daily_trend,
        })
    }

    /// Deletes acknowledged alerts older than the retention window.
    /// Unread alerts are never purged, whatever their age. Returns the
    /// number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn purge_old(&self, retention_days: Option<i64>) -> Result<u64, DbErr> {
        let retention = retention_days.unwrap_or(DEFAULT_RETENTION_DAYS);
        let cutoff = Utc::now() - Duration::days(retention);

        let result = security_alerts::Entity::delete_many()
            .filter(security_alerts::Column::CreatedAt.lt(cutoff))
            .filter(security_alerts::Column::Status.ne(AlertStatus::Unread.as_str()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Applies a status change to an owned alert and appends an action
    /// record. Transitions are idempotent and never rejected; first-seen
    /// timestamps are preserved.
    async fn apply_action(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        status: AlertStatus,
        notes: Option<String>,
    ) -> Result<Option<security_alerts::Model>, DbErr> {
        let alert = security_alerts::Entity::find_by_id(alert_id)
            .filter(security_alerts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let Some(alert) = alert else {
            return Ok(None);
        };

        let now: DateTime<Utc> = Utc::now();
        let read_at = alert.read_at.or_else(|| Some(now.into()));
        let resolved_at = if status == AlertStatus::Resolved {
            alert.resolved_at.or_else(|| Some(now.into()))
        } else {
            alert.resolved_at
        };

        let mut actions = match &alert.actions {
            serde_json::Value::Array(entries) => entries.clone(),
            _ => Vec::new(),
        };
        actions.push(json!({
            "action": status.as_str(),
            "at": now.to_rfc3339(),
            "notes": notes,
        }));

        let mut active = alert.into_active_model();
        active.status = Set(status.as_str().to_string());
        active.read_at = Set(read_at);
        active.resolved_at = Set(resolved_at);
        active.actions = Set(serde_json::Value::Array(actions));

        active.update(&self.db).await.map(Some)
    }
}
