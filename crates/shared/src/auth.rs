//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access and refresh tokens.
///
/// Claims carry the session id so authenticated requests can heartbeat the
/// owning session and logout can revoke it without a database lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Session ID this token belongs to.
    pub sid: Uuid,
    /// User's role (citizen, department, admin).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user session.
    #[must_use]
    pub fn new(user_id: Uuid, session_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            sid: session_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the session ID from claims.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.sid
    }
}

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// Full name.
    pub full_name: String,
}

/// Token refresh request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token issued at login or at the last rotation.
    pub refresh_token: String,
}

/// Risk summary attached to a login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRiskSummary {
    /// Computed risk score (0-100).
    pub risk_score: u8,
    /// Discrete risk level.
    pub risk_level: String,
    /// Whether the client should prompt for step-up verification.
    pub requires_verification: bool,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user.
    pub user: UserInfo,
    /// Session created for this login.
    pub session_id: Uuid,
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// Risk assessment for this login.
    pub risk: LoginRiskSummary,
}

/// User information in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Role.
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip_ids() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            session_id,
            "citizen",
            Utc::now() + chrono::Duration::minutes(15),
        );

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.session_id(), session_id);
        assert!(claims.exp > claims.iat);
    }
}
