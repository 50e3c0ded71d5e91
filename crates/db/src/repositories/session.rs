//! Session repository: creation with risk assessment, activity tracking,
//! refresh rotation, revocation, and lifecycle sweeps.
//!
//! One row per login lineage. Refresh-token rotation updates the stored
//! hash in place; revocation flips `is_active` and leaves the row for the
//! retention sweep.

use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use civitrack_core::fingerprint::{Coordinates, Fingerprint, LoginMethod};
use civitrack_core::risk::{self, RiskAssessment, SessionObservation};

use crate::entities::sessions;

/// Default session lifetime.
const DEFAULT_TTL_DAYS: i64 = 7;

/// Inputs for creating a session at login time.
#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    /// Session id override. Callers that sign the id into tokens before
    /// the insert generate it themselves.
    pub session_id: Option<Uuid>,
    /// Owner of the session.
    pub user_id: Uuid,
    /// Fingerprint computed for this login.
    pub fingerprint: Fingerprint,
    /// How the user authenticated.
    pub login_method: LoginMethod,
    /// The refresh token issued for this session; only its hash is stored.
    pub refresh_token: String,
    /// Absolute expiry override; defaults to now plus the configured TTL.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of creating a session.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    /// The persisted session row.
    pub session: sessions::Model,
    /// Risk assessment computed against the user's active-session history.
    pub assessment: RiskAssessment,
    /// How many active sessions existed before this login.
    pub prior_sessions: usize,
    /// Whether an active session with the same device fingerprint existed.
    pub known_device: bool,
    /// Whether an active session from the same country existed.
    pub known_country: bool,
}

/// Outcome of a single-session revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The session was active and is now revoked.
    Revoked,
    /// The session exists but was already inactive; no-op.
    AlreadyInactive,
    /// No session with that id belongs to the user.
    NotFound,
}

/// Aggregated per-user session security statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityStats {
    /// All sessions on record, active or not.
    pub total_sessions: u64,
    /// Sessions that are active and unexpired.
    pub active_sessions: u64,
    /// Mean risk score across all sessions on record.
    pub average_risk_score: f64,
    /// Distinct resolved countries, alphabetical.
    pub countries: Vec<String>,
    /// Distinct device types seen, alphabetical.
    pub device_types: Vec<String>,
    /// Most recent login.
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Session repository: the session store.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
    session_ttl: Duration,
}

impl SessionRepository {
    /// Creates a session repository with the default 7-day TTL.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            session_ttl: Duration::days(DEFAULT_TTL_DAYS),
        }
    }

    /// Overrides the default session TTL.
    #[must_use]
    pub const fn with_ttl_days(mut self, days: i64) -> Self {
        self.session_ttl = Duration::days(days);
        self
    }

    /// Hashes a refresh token for storage and lookup.
    ///
    /// Raw tokens are never persisted.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Creates a session, scoring the login against the user's
    /// active-session history first.
    ///
    /// The assessment is computed from whatever fingerprint was resolved;
    /// degraded lookups simply contribute no geographic factors.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query or the insert fails.
    pub async fn create(&self, input: CreateSessionInput) -> Result<CreatedSession, DbErr> {
        let now = Utc::now();

        // Newest login first: geographic anomaly checks compare against
        // the most recent prior session only.
        let history = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(input.user_id))
            .filter(sessions::Column::IsActive.eq(true))
            .filter(sessions::Column::ExpiresAt.gt(now))
            .order_by_desc(sessions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let observations: Vec<SessionObservation> =
            history.iter().map(observation_from_model).collect();

        let assessment = risk::score(&input.fingerprint, &observations, now);

        let device = &input.fingerprint.device;
        let known_device = history.iter().any(|s| {
            s.device_type == device.device_type.as_str()
                && s.device_os == device.os
                && s.device_app == device.app
        });
        let location = &input.fingerprint.location;
        let known_country = history.iter().any(|s| s.country == location.country);

        let expires_at = input
            .expires_at
            .unwrap_or_else(|| now + self.session_ttl);

        let session = sessions::ActiveModel {
            id: Set(input.session_id.unwrap_or_else(Uuid::new_v4)),
            user_id: Set(input.user_id),
            refresh_token_family: Set(Uuid::new_v4()),
            refresh_token_hash: Set(Self::hash_token(&input.refresh_token)),
            device_type: Set(device.device_type.as_str().to_string()),
            device_os: Set(device.os.clone()),
            device_app: Set(device.app.clone()),
            device_raw: Set(device.raw.clone()),
            ip_address: Set(location.ip.clone()),
            country: Set(location.country.clone()),
            country_code: Set(location.country_code.clone()),
            region: Set(location.region.clone()),
            city: Set(location.city.clone()),
            timezone: Set(location.timezone.clone()),
            latitude: Set(location.coordinates.map(|c| c.latitude)),
            longitude: Set(location.coordinates.map(|c| c.longitude)),
            network_operator: Set(location.operator.clone()),
            is_vpn: Set(input.fingerprint.anonymity.is_vpn),
            is_proxy: Set(input.fingerprint.anonymity.is_proxy),
            is_tor: Set(input.fingerprint.anonymity.is_tor),
            risk_score: Set(i16::from(assessment.score)),
            risk_level: Set(assessment.level.as_str().to_string()),
            requires_verification: Set(assessment.requires_verification),
            verified_at: Set(None),
            is_active: Set(true),
            login_method: Set(input.login_method.as_str().to_string()),
            total_duration_secs: Set(0),
            refresh_count: Set(0),
            created_at: Set(now.into()),
            last_active_at: Set(now.into()),
            expires_at: Set(expires_at.into()),
        };

        let prior_sessions = history.len();
        let session = session.insert(&self.db).await?;

        Ok(CreatedSession {
            session,
            assessment,
            prior_sessions,
            known_device,
            known_country,
        })
    }

    /// Finds a session by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<sessions::Model>, DbErr> {
        sessions::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds the active, unexpired session holding the given refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<sessions::Model>, DbErr> {
        sessions::Entity::find()
            .filter(sessions::Column::RefreshTokenHash.eq(Self::hash_token(token)))
            .filter(sessions::Column::IsActive.eq(true))
            .filter(sessions::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
    }

    /// Lists a user's active, unexpired sessions, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<sessions::Model>, DbErr> {
        sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::IsActive.eq(true))
            .filter(sessions::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(sessions::Column::LastActiveAt)
            .all(&self.db)
            .await
    }

    /// Records a heartbeat on a session, best-effort.
    ///
    /// Failures are logged and swallowed: activity tracking must never
    /// fail an authenticated request. A missing or already-revoked
    /// session is a tolerated race, not an error.
    pub async fn touch_activity(&self, session_id: Uuid) {
        match self.find_by_id(session_id).await {
            Ok(Some(session)) if session.is_active => {
                let now = Utc::now();
                let created_at = session.created_at.with_timezone(&Utc);
                let mut active = session.into_active_model();
                active.last_active_at = Set(now.into());
                active.total_duration_secs = Set((now - created_at).num_seconds());
                if let Err(err) = active.update(&self.db).await {
                    warn!(%session_id, error = %err, "failed to record session activity");
                }
            }
            Ok(Some(_)) => {
                debug!(%session_id, "skipping heartbeat for inactive session");
            }
            Ok(None) => {
                debug!(%session_id, "skipping heartbeat for unknown session");
            }
            Err(err) => {
                warn!(%session_id, error = %err, "failed to load session for heartbeat");
            }
        }
    }

    /// Rotates a session's refresh token in place.
    ///
    /// Returns `None` when the session is missing or inactive; callers
    /// treat that as an invalid refresh attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn rotate_refresh_token(
        &self,
        session_id: Uuid,
        new_token: &str,
    ) -> Result<Option<sessions::Model>, DbErr> {
        let Some(session) = self.find_by_id(session_id).await? else {
            return Ok(None);
        };
        if !session.is_active {
            return Ok(None);
        }

        let now = Utc::now();
        let created_at = session.created_at.with_timezone(&Utc);
        let refresh_count = session.refresh_count;
        let mut active = session.into_active_model();
        active.refresh_token_hash = Set(Self::hash_token(new_token));
        active.refresh_count = Set(refresh_count + 1);
        active.last_active_at = Set(now.into());
        active.total_duration_secs = Set((now - created_at).num_seconds());

        active.update(&self.db).await.map(Some)
    }

    /// Revokes a single session owned by the user.
    ///
    /// Idempotent: revoking an already-inactive session reports
    /// [`RevokeOutcome::AlreadyInactive`] without touching the row.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query or update fails.
    pub async fn revoke(&self, session_id: Uuid, user_id: Uuid) -> Result<RevokeOutcome, DbErr> {
        let session = sessions::Entity::find_by_id(session_id)
            .filter(sessions::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let Some(session) = session else {
            return Ok(RevokeOutcome::NotFound);
        };
        if !session.is_active {
            return Ok(RevokeOutcome::AlreadyInactive);
        }

        let mut active = session.into_active_model();
        active.is_active = Set(false);
        active.last_active_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(RevokeOutcome::Revoked)
    }

    /// Revokes every active session of the user except the given one, in a
    /// single statement. Returns the number of sessions revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn revoke_all_except(
        &self,
        user_id: Uuid,
        current_session_id: Uuid,
    ) -> Result<u64, DbErr> {
        let result = sessions::Entity::update_many()
            .col_expr(sessions::Column::IsActive, Expr::value(false))
            .col_expr(sessions::Column::LastActiveAt, Expr::value(Utc::now()))
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::Id.ne(current_session_id))
            .filter(sessions::Column::IsActive.eq(true))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Deletes expired sessions and inactive sessions idle beyond the
    /// retention window. Returns the number of rows deleted.
    ///
    /// Active, unexpired sessions are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn cleanup_expired(&self, inactive_retention: Duration) -> Result<u64, DbErr> {
        let now = Utc::now();
        let stale_cutoff = now - inactive_retention;

        let result = sessions::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(sessions::Column::ExpiresAt.lt(now))
                    .add(
                        Condition::all()
                            .add(sessions::Column::IsActive.eq(false))
                            .add(sessions::Column::LastActiveAt.lt(stale_cutoff)),
                    ),
            )
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Aggregates per-user session security statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn security_stats(&self, user_id: Uuid) -> Result<SecurityStats, DbErr> {
        let now = Utc::now();
        let all = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        let total = all.len() as u64;
        let active = all
            .iter()
            .filter(|s| s.is_active && s.expires_at.with_timezone(&Utc) > now)
            .count() as u64;

        let average_risk_score = if all.is_empty() {
            0.0
        } else {
            let sum: f64 = all.iter().map(|s| f64::from(s.risk_score)).sum();
            sum / all.len() as f64
        };

        let mut countries: Vec<String> = all
            .iter()
            .filter(|s| s.country != "Unknown" && s.country != "Local")
            .map(|s| s.country.clone())
            .collect();
        countries.sort();
        countries.dedup();

        let mut device_types: Vec<String> = all.iter().map(|s| s.device_type.clone()).collect();
        device_types.sort();
        device_types.dedup();

        let last_login_at = all
            .iter()
            .map(|s| s.created_at.with_timezone(&Utc))
            .max();

        Ok(SecurityStats {
            total_sessions: total,
            active_sessions: active,
            average_risk_score,
            countries,
            device_types,
            last_login_at,
        })
    }
}

/// Projects a stored session into the slice the scoring engine consumes.
fn observation_from_model(session: &sessions::Model) -> SessionObservation {
    let country = match session.country.as_str() {
        "" | "Unknown" | "Local" => None,
        known => Some(known.to_string()),
    };
    let coordinates = match (session.latitude, session.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    SessionObservation {
        created_at: session.created_at.with_timezone(&Utc),
        country,
        coordinates,
        device_type: session.device_type.clone(),
    }
}
