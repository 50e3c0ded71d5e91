//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles within the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Files issues, manages their own sessions and alerts.
    Citizen,
    /// Department staff, triages and resolves assigned issues.
    Department,
    /// Full access, system oversight.
    Admin,
}

impl UserRole {
    /// Returns true if this role can view other users' sessions.
    #[must_use]
    pub const fn can_oversee_sessions(&self) -> bool {
        matches!(self, Self::Admin)
    }

}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Citizen => write!(f, "citizen"),
            Self::Department => write!(f, "department"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.can_oversee_sessions());
        assert!(!UserRole::Citizen.can_oversee_sessions());
        assert!(!UserRole::Department.can_oversee_sessions());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(UserRole::Citizen.to_string(), "citizen");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
