//! Severity-driven notification fan-out policy.

use super::types::{AlertSeverity, NotificationChannel};

/// Selects the notification channels to schedule for a severity.
///
/// Critical alerts fan out everywhere, high adds email to the default
/// push, everything else is push only. The sink records this set as
/// scheduling intent; delivery itself happens out-of-band.
#[must_use]
pub fn channels_for(severity: AlertSeverity) -> Vec<NotificationChannel> {
    match severity {
        AlertSeverity::Critical => vec![
            NotificationChannel::Email,
            NotificationChannel::Push,
            NotificationChannel::Sms,
        ],
        AlertSeverity::High => vec![NotificationChannel::Email, NotificationChannel::Push],
        AlertSeverity::Medium | AlertSeverity::Low => vec![NotificationChannel::Push],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_fans_out_everywhere() {
        let channels = channels_for(AlertSeverity::Critical);
        assert_eq!(channels.len(), 3);
        assert!(channels.contains(&NotificationChannel::Sms));
    }

    #[test]
    fn test_high_gets_email_and_push() {
        let channels = channels_for(AlertSeverity::High);
        assert_eq!(
            channels,
            vec![NotificationChannel::Email, NotificationChannel::Push]
        );
    }

    #[test]
    fn test_low_and_medium_push_only() {
        assert_eq!(
            channels_for(AlertSeverity::Low),
            vec![NotificationChannel::Push]
        );
        assert_eq!(
            channels_for(AlertSeverity::Medium),
            vec![NotificationChannel::Push]
        );
    }
}
