//! Typed alert metadata.
//!
//! Known alert types carry a known metadata shape; the `Extra` variant is
//! the open key-value fallback for fields that genuinely vary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to a security alert, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertMetadata {
    /// Snapshot of the login that triggered the alert.
    Login {
        /// Network address the login came from.
        ip: String,
        /// Coarse device description.
        device: String,
        /// Resolved "city, country" string.
        location: String,
        /// Computed risk score.
        risk_score: u8,
        /// Factors the risk engine reported.
        risk_factors: Vec<String>,
    },
    /// A single session was revoked.
    SessionRevoked {
        /// The revoked session.
        session_id: Uuid,
        /// Caller-supplied reason, if any.
        reason: Option<String>,
    },
    /// Sessions were revoked in bulk.
    BulkRevocation {
        /// How many sessions the bulk revoke affected.
        revoked_count: u64,
    },
    /// The user reported suspicious activity.
    UserReport {
        /// Free-text description from the user.
        details: Option<String>,
    },
    /// Open key-value bag for anything else.
    Extra {
        /// Arbitrary extra fields.
        #[serde(flatten)]
        fields: serde_json::Map<String, serde_json::Value>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_metadata_roundtrip() {
        let meta = AlertMetadata::Login {
            ip: "203.0.113.9".into(),
            device: "Chrome on Windows".into(),
            location: "London, United Kingdom".into(),
            risk_score: 35,
            risk_factors: vec!["Impossible travel detected".into()],
        };

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["kind"], "login");
        let back: AlertMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_extra_keeps_unknown_fields() {
        let value = json!({
            "kind": "extra",
            "export_format": "csv",
            "requested_by": "support"
        });

        let meta: AlertMetadata = serde_json::from_value(value).unwrap();
        match meta {
            AlertMetadata::Extra { fields } => {
                assert_eq!(fields["export_format"], "csv");
            }
            other => panic!("expected Extra, got {other:?}"),
        }
    }
}
