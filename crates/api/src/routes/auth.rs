//! Authentication routes for login, register, token refresh, and logout.
//!
//! Login is where the security pipeline runs: the request is
//! fingerprinted, scored against the user's active-session history, the
//! session is persisted with its assessment, and any warranted security
//! alerts are raised before the tokens go back to the client.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::respond::internal_error;
use civitrack_core::alert::{AlertMetadata, AlertType};
use civitrack_core::auth::{UserRole, hash_password, verify_password};
use civitrack_core::fingerprint::{self, LoginMethod};
use civitrack_core::risk::RiskLevel;
use civitrack_db::repositories::{CreateSessionInput, CreatedSession, NewAlert};
use civitrack_db::{AlertRepository, SessionRepository, UserRepository};
use civitrack_shared::auth::{
    LoginRequest, LoginResponse, LoginRiskSummary, RefreshRequest, RegisterRequest, TokenPair,
    UserInfo,
};
use civitrack_shared::{JwtError, JwtService};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that require an authenticated session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}

/// Extracts the originating client address from forwarding headers.
///
/// Takes the first entry of `X-Forwarded-For` when present; otherwise the
/// request is treated as local.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| "127.0.0.1".to_string(), ToString::to_string)
}

/// Extracts the raw client-identifier string, empty when absent.
fn raw_client(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Signs the access/refresh pair for a session id that has not been
/// persisted yet, so nothing is stored when signing fails.
fn issue_tokens(
    jwt: &JwtService,
    user_id: Uuid,
    session_id: Uuid,
    role: &str,
) -> Result<(String, String), JwtError> {
    let access = jwt.generate_access_token(user_id, session_id, role)?;
    let refresh = jwt.generate_refresh_token(user_id, session_id, role)?;
    Ok((access, refresh))
}

/// POST /auth/login - Authenticate user and return tokens.
#[allow(clippy::too_many_lines)]
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    if !user.is_active {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "account_disabled",
                "message": "This account has been disabled"
            })),
        )
            .into_response();
    }

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    // Fingerprint the request; this never fails, lookup errors degrade
    // to an unknown location.
    let ip = client_ip(&headers);
    let raw = raw_client(&headers);
    let fp = fingerprint::fingerprint(&raw, &ip, state.geo.as_ref()).await;

    // The session id goes into both tokens, so it is generated first,
    // and both tokens are signed before the session row exists: a
    // signing failure must not leave an orphaned active session behind.
    let session_id = Uuid::new_v4();
    let (access_token, refresh_token) =
        match issue_tokens(&state.jwt_service, user.id, session_id, &user.role) {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Failed to sign session tokens");
                return internal_error("An error occurred during login");
            }
        };

    let session_repo = SessionRepository::new((*state.db).clone())
        .with_ttl_days(state.security.session_ttl_days);
    let created = match session_repo
        .create(CreateSessionInput {
            session_id: Some(session_id),
            user_id: user.id,
            fingerprint: fp,
            login_method: LoginMethod::Password,
            refresh_token: refresh_token.clone(),
            expires_at: None,
        })
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to create session");
            return internal_error("An error occurred during login");
        }
    };

    // Alerts are best-effort; a failed insert is logged, never surfaced.
    let alert_repo =
        AlertRepository::new((*state.db).clone()).with_dispatcher(state.dispatcher.clone());
    raise_login_alerts(&alert_repo, user.id, &created).await;

    info!(
        user_id = %user.id,
        session_id = %session_id,
        risk_score = created.assessment.score,
        risk_level = created.assessment.level.as_str(),
        "User logged in successfully"
    );

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        },
        session_id,
        tokens: TokenPair {
            access_token,
            refresh_token,
            expires_in: state.jwt_service.access_token_expires_in(),
        },
        risk: LoginRiskSummary {
            risk_score: created.assessment.score,
            risk_level: created.assessment.level.as_str().to_string(),
            requires_verification: created.assessment.requires_verification,
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Raises the security alerts warranted by a fresh login.
async fn raise_login_alerts(alert_repo: &AlertRepository, user_id: Uuid, created: &CreatedSession) {
    let session = &created.session;
    let metadata = AlertMetadata::Login {
        ip: session.ip_address.clone(),
        device: format!("{} on {}", session.device_app, session.device_os),
        location: format!("{}, {}", session.city, session.country),
        risk_score: created.assessment.score,
        risk_factors: created.assessment.factors.clone(),
    };

    let mut warranted: Vec<(AlertType, &str, String)> = Vec::new();

    if created
        .assessment
        .factors
        .iter()
        .any(|f| f == "Impossible travel detected")
    {
        warranted.push((
            AlertType::ImpossibleTravel,
            "Impossible travel detected",
            format!(
                "A login from {}, {} could not be reconciled with your previous session's location.",
                session.city, session.country
            ),
        ));
    } else if created.assessment.level == RiskLevel::High {
        warranted.push((
            AlertType::SuspiciousLocation,
            "High-risk login detected",
            format!(
                "A login from {}, {} scored {} on risk checks.",
                session.city, session.country, created.assessment.score
            ),
        ));
    }

    // First-ever login is the baseline, not an anomaly.
    if created.prior_sessions > 0 {
        if !created.known_device {
            warranted.push((
                AlertType::NewDevice,
                "Login from a new device",
                format!(
                    "Your account was accessed from {} on {}, which has not been seen before.",
                    session.device_app, session.device_os
                ),
            ));
        }
        if !created.known_country
            && session.country != "Unknown"
            && session.country != "Local"
        {
            warranted.push((
                AlertType::NewLocation,
                "Login from a new location",
                format!(
                    "Your account was accessed from {}, {} for the first time.",
                    session.city, session.country
                ),
            ));
        }
    }

    for (alert_type, title, description) in warranted {
        let result = alert_repo
            .raise(NewAlert {
                user_id,
                session_id: Some(session.id),
                alert_type,
                severity: None,
                title: title.to_string(),
                description,
                metadata: metadata.clone(),
            })
            .await;
        if let Err(e) = result {
            warn!(
                error = %e,
                %user_id,
                alert_type = alert_type.as_str(),
                "Failed to raise login alert"
            );
        }
    }
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if !payload.email.contains('@') || payload.full_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "A valid email and a full name are required"
            })),
        )
            .into_response();
    }
    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Password must be at least 8 characters"
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_taken",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error during registration");
            return internal_error("An error occurred during registration");
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing error");
            return internal_error("An error occurred during registration");
        }
    };

    let user = match user_repo
        .create(
            &payload.email,
            &password_hash,
            payload.full_name.trim(),
            UserRole::Citizen,
        )
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("An error occurred during registration");
        }
    };

    info!(user_id = %user.id, "User registered");

    (
        StatusCode::CREATED,
        Json(UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        }),
    )
        .into_response()
}

/// POST /auth/refresh - Rotate the refresh token and issue a new pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(civitrack_shared::JwtError::Expired) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "token_expired",
                    "message": "Refresh token has expired"
                })),
            )
                .into_response();
        }
        Err(_) => {
            return invalid_refresh();
        }
    };

    let session_repo = SessionRepository::new((*state.db).clone());

    // The stored hash is the source of truth: a rotated-away or revoked
    // token no longer resolves, whatever its JWT expiry says.
    let session = match session_repo
        .find_by_refresh_token(&payload.refresh_token)
        .await
    {
        Ok(Some(s)) => s,
        Ok(None) => {
            info!(session_id = %claims.session_id(), "Refresh with stale or revoked token");
            return invalid_refresh();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    };

    if session.id != claims.session_id() || session.user_id != claims.user_id() {
        warn!(
            session_id = %session.id,
            claimed_session = %claims.session_id(),
            "Refresh token claims do not match the session that holds it"
        );
        return invalid_refresh();
    }

    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo.is_active(session.user_id).await {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "account_disabled",
                    "message": "This account has been disabled"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    }

    let new_refresh = match state.jwt_service.generate_refresh_token(
        session.user_id,
        session.id,
        &claims.role,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during token refresh");
        }
    };

    match session_repo
        .rotate_refresh_token(session.id, &new_refresh)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            // Lost a race with a revocation; treat like any stale token.
            return invalid_refresh();
        }
        Err(e) => {
            error!(error = %e, "Failed to rotate refresh token");
            return internal_error("An error occurred during token refresh");
        }
    }

    let access_token = match state.jwt_service.generate_access_token(
        session.user_id,
        session.id,
        &claims.role,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during token refresh");
        }
    };

    (
        StatusCode::OK,
        Json(TokenPair {
            access_token,
            refresh_token: new_refresh,
            expires_in: state.jwt_service.access_token_expires_in(),
        }),
    )
        .into_response()
}

/// POST /auth/logout - Revoke the current session.
async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.revoke(auth.session_id(), auth.user_id()).await {
        Ok(_) => {
            // Already-revoked and unknown sessions land here too; logout
            // is idempotent from the client's point of view.
            info!(user_id = %auth.user_id(), session_id = %auth.session_id(), "User logged out");
            (
                StatusCode::OK,
                Json(json!({ "message": "Logged out" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error during logout");
            internal_error("An error occurred during logout")
        }
    }
}

fn invalid_refresh() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_refresh_token",
            "message": "Refresh token is no longer valid"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[rstest]
    #[case("203.0.113.9", "203.0.113.9")]
    #[case("203.0.113.9, 10.0.0.1", "203.0.113.9")]
    #[case("  198.51.100.7 ,10.0.0.1", "198.51.100.7")]
    fn test_client_ip_takes_first_forwarded_entry(#[case] header: &str, #[case] expected: &str) {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(header).unwrap());
        assert_eq!(client_ip(&headers), expected);
    }

    #[test]
    fn test_client_ip_defaults_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn test_raw_client_empty_when_no_user_agent() {
        assert_eq!(raw_client(&HeaderMap::new()), "");
    }

    #[test]
    fn test_issue_tokens_needs_no_stored_session() {
        let jwt = JwtService::new(civitrack_shared::jwt::JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            ..Default::default()
        });
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let (access, refresh) = issue_tokens(&jwt, user_id, session_id, "citizen").unwrap();

        // Both tokens already carry the session id the row will be
        // persisted under.
        let access_claims = jwt.validate_token(&access).unwrap();
        let refresh_claims = jwt.validate_token(&refresh).unwrap();
        assert_eq!(access_claims.session_id(), session_id);
        assert_eq!(refresh_claims.session_id(), session_id);
        assert_eq!(access_claims.user_id(), user_id);
    }
}
