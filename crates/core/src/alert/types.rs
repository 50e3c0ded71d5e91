//! Alert classification enums.

use serde::{Deserialize, Serialize};

/// Security-relevant event types surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// First login from an unseen device.
    NewDevice,
    /// Login from a location not seen before.
    NewLocation,
    /// Login from a location the risk engine flagged.
    SuspiciousLocation,
    /// Two sessions whose distance could not be covered in the elapsed time.
    ImpossibleTravel,
    /// Repeated failed login attempts.
    MultipleFailedAttempts,
    /// Password was changed.
    PasswordChanged,
    /// Account was locked.
    AccountLocked,
    /// Account was unlocked.
    AccountUnlocked,
    /// Security settings were modified.
    SecuritySettingsChanged,
    /// A data export was requested.
    DataExportRequested,
    /// Account deletion was requested.
    AccountDeletionRequested,
    /// Activity that matched no specific pattern but looked off.
    UnusualActivity,
    /// The user reported suspicious activity themselves.
    UserReportedSuspicious,
    /// A single session was revoked.
    SessionRevoked,
    /// All other sessions were revoked in bulk.
    AllSessionsRevoked,
}

impl AlertType {
    /// Returns the snake_case string form used in storage and filters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewDevice => "new_device",
            Self::NewLocation => "new_location",
            Self::SuspiciousLocation => "suspicious_location",
            Self::ImpossibleTravel => "impossible_travel",
            Self::MultipleFailedAttempts => "multiple_failed_attempts",
            Self::PasswordChanged => "password_changed",
            Self::AccountLocked => "account_locked",
            Self::AccountUnlocked => "account_unlocked",
            Self::SecuritySettingsChanged => "security_settings_changed",
            Self::DataExportRequested => "data_export_requested",
            Self::AccountDeletionRequested => "account_deletion_requested",
            Self::UnusualActivity => "unusual_activity",
            Self::UserReportedSuspicious => "user_reported_suspicious",
            Self::SessionRevoked => "session_revoked",
            Self::AllSessionsRevoked => "all_sessions_revoked",
        }
    }

    /// Default severity for this alert type.
    ///
    /// Which types rank critical versus high is a product decision still
    /// under review; this mapping is the current call.
    #[must_use]
    pub const fn default_severity(&self) -> AlertSeverity {
        match self {
            Self::ImpossibleTravel | Self::AccountLocked | Self::UserReportedSuspicious => {
                AlertSeverity::Critical
            }
            Self::SuspiciousLocation
            | Self::MultipleFailedAttempts
            | Self::AccountDeletionRequested => AlertSeverity::High,
            Self::NewDevice
            | Self::NewLocation
            | Self::PasswordChanged
            | Self::SecuritySettingsChanged
            | Self::UnusualActivity
            | Self::AllSessionsRevoked => AlertSeverity::Medium,
            Self::AccountUnlocked | Self::DataExportRequested | Self::SessionRevoked => {
                AlertSeverity::Low
            }
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_device" => Ok(Self::NewDevice),
            "new_location" => Ok(Self::NewLocation),
            "suspicious_location" => Ok(Self::SuspiciousLocation),
            "impossible_travel" => Ok(Self::ImpossibleTravel),
            "multiple_failed_attempts" => Ok(Self::MultipleFailedAttempts),
            "password_changed" => Ok(Self::PasswordChanged),
            "account_locked" => Ok(Self::AccountLocked),
            "account_unlocked" => Ok(Self::AccountUnlocked),
            "security_settings_changed" => Ok(Self::SecuritySettingsChanged),
            "data_export_requested" => Ok(Self::DataExportRequested),
            "account_deletion_requested" => Ok(Self::AccountDeletionRequested),
            "unusual_activity" => Ok(Self::UnusualActivity),
            "user_reported_suspicious" => Ok(Self::UserReportedSuspicious),
            "session_revoked" => Ok(Self::SessionRevoked),
            "all_sessions_revoked" => Ok(Self::AllSessionsRevoked),
            _ => Err(()),
        }
    }
}

/// Alert severity, one reconciled four-level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Routine, informational.
    Low,
    /// Worth seeing, no action expected.
    Medium,
    /// Action recommended.
    High,
    /// Action required.
    Critical,
}

impl AlertSeverity {
    /// Returns the lowercase string form used in storage and filters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}

/// User-facing alert state.
///
/// Normal flow is unread → read/dismissed → resolved, but nothing enforces
/// monotonicity; any state may be set directly and transitions are
/// idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Not yet seen by the user.
    Unread,
    /// Seen.
    Read,
    /// Seen and dismissed as uninteresting.
    Dismissed,
    /// Investigated and closed out.
    Resolved,
}

impl AlertStatus {
    /// Returns the lowercase string form used in storage and filters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Dismissed => "dismissed",
            Self::Resolved => "resolved",
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            "dismissed" => Ok(Self::Dismissed),
            "resolved" => Ok(Self::Resolved),
            _ => Err(()),
        }
    }
}

/// Out-of-band notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Email delivery.
    Email,
    /// Mobile/web push.
    Push,
    /// SMS delivery.
    Sms,
}

impl NotificationChannel {
    /// Returns the lowercase string form recorded as scheduling intent.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Push => "push",
            Self::Sms => "sms",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_type_string_roundtrip() {
        let types = [
            AlertType::NewDevice,
            AlertType::ImpossibleTravel,
            AlertType::UserReportedSuspicious,
            AlertType::AllSessionsRevoked,
        ];
        for t in types {
            assert_eq!(t.as_str().parse::<AlertType>(), Ok(t));
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::High < AlertSeverity::Critical);
    }

    #[test]
    fn test_unknown_strings_rejected() {
        assert!("warning".parse::<AlertSeverity>().is_err());
        assert!("pending".parse::<AlertStatus>().is_err());
        assert!("something_else".parse::<AlertType>().is_err());
    }
}
