//! The risk scoring engine.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use super::geo::haversine_km;
use super::types::{RiskAssessment, RiskLevel, SessionObservation};
use crate::fingerprint::{DeviceType, Fingerprint};

const VPN_POINTS: u16 = 20;
const PROXY_POINTS: u16 = 15;
const TOR_POINTS: u16 = 30;
const UNKNOWN_DEVICE_POINTS: u16 = 10;
const MISSING_CLIENT_POINTS: u16 = 5;
const IMPOSSIBLE_TRAVEL_POINTS: u16 = 25;
const RAPID_LOCATION_POINTS: u16 = 15;
const NEW_COUNTRY_POINTS: u16 = 10;
const ODD_HOUR_POINTS: u16 = 5;

/// Score above which step-up verification is required.
const VERIFICATION_THRESHOLD: u8 = 50;

/// Score above which the recommendations escalate.
const ESCALATION_THRESHOLD: u8 = 70;

/// Scores a new login against the user's session history.
///
/// Pure and deterministic: `at` is the event timestamp, passed in rather
/// than read from the clock, and `history` is ordered newest-first. The
/// returned score is the clamped sum of the individual factors.
#[must_use]
pub fn score(
    fingerprint: &Fingerprint,
    history: &[SessionObservation],
    at: DateTime<Utc>,
) -> RiskAssessment {
    let mut points: u16 = 0;
    let mut factors = Vec::new();

    if fingerprint.anonymity.is_vpn {
        points += VPN_POINTS;
        factors.push("VPN connection detected".to_string());
    }
    if fingerprint.anonymity.is_proxy {
        points += PROXY_POINTS;
        factors.push("Proxy connection detected".to_string());
    }
    if fingerprint.anonymity.is_tor {
        points += TOR_POINTS;
        factors.push("Tor network detected".to_string());
    }

    if fingerprint.device.device_type == DeviceType::Unknown {
        points += UNKNOWN_DEVICE_POINTS;
        factors.push("Unrecognized device type".to_string());
    }
    if fingerprint.device.raw.is_empty() {
        points += MISSING_CLIENT_POINTS;
        factors.push("Missing client identifier".to_string());
    }

    if let Some(previous) = history.first() {
        // Geographic anomaly against the most recent prior session only.
        if let (Some(new_coords), Some(prev_coords)) =
            (fingerprint.location.coordinates, previous.coordinates)
        {
            let distance_km = haversine_km(new_coords, prev_coords);
            let elapsed_hours = elapsed_hours(previous.created_at, at);

            if distance_km > 1000.0 && elapsed_hours < 6.0 {
                points += IMPOSSIBLE_TRAVEL_POINTS;
                factors.push("Impossible travel detected".to_string());
            } else if distance_km > 500.0 && elapsed_hours < 2.0 {
                points += RAPID_LOCATION_POINTS;
                factors.push("Rapid location change".to_string());
            }
        }

        // Country change is checked independently of the distance check.
        if let Some(prev_country) = previous.country.as_deref() {
            let new_country = fingerprint.location.country.as_str();
            if country_is_known(new_country)
                && country_is_known(prev_country)
                && new_country != prev_country
            {
                points += NEW_COUNTRY_POINTS;
                factors.push("Login from a new country".to_string());
            }
        }
    }

    let hour = local_hour(at, &fingerprint.location.timezone);
    if hour < 6 || hour > 23 {
        points += ODD_HOUR_POINTS;
        factors.push("Unusual login hour".to_string());
    }

    let score = u8::try_from(points.min(100)).unwrap_or(100);
    let requires_verification = score > VERIFICATION_THRESHOLD;

    let mut recommendations = Vec::new();
    if score > ESCALATION_THRESHOLD {
        recommendations.push("Require immediate step-up verification".to_string());
        recommendations.push("Cap session lifetime at 1 hour".to_string());
    }
    if fingerprint.anonymity.is_tor {
        recommendations.push("Block the connection or require enhanced verification".to_string());
    }
    if factors.iter().any(|f| f == "Impossible travel detected") {
        recommendations.push("Notify the account owner of the new location".to_string());
    }

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        factors,
        requires_verification,
        recommendations,
    }
}

fn elapsed_hours(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let millis = (later - earlier).num_milliseconds();
    #[allow(clippy::cast_precision_loss)]
    {
        millis as f64 / 3_600_000.0
    }
}

/// Converts the event timestamp into the location's local hour. Unparseable
/// or absent timezones fall back to UTC, keeping the result deterministic.
fn local_hour(at: DateTime<Utc>, timezone: &str) -> u32 {
    timezone
        .parse::<Tz>()
        .map_or_else(|_| at.hour(), |tz| at.with_timezone(&tz).hour())
}

fn country_is_known(country: &str) -> bool {
    !country.is_empty() && country != "Unknown" && country != "Local"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{AnonymityFlags, Coordinates, DeviceInfo, Location};
    use chrono::TimeZone;

    fn web_device() -> DeviceInfo {
        DeviceInfo {
            device_type: DeviceType::Web,
            os: "Windows".into(),
            app: "Chrome".into(),
            raw: "Mozilla/5.0 (Windows NT 10.0) Chrome/120.0".into(),
        }
    }

    fn location_at(country: &str, lat: f64, lon: f64) -> Location {
        Location {
            ip: "203.0.113.9".into(),
            country: country.into(),
            country_code: "XX".into(),
            region: "Region".into(),
            city: "City".into(),
            timezone: "UTC".into(),
            coordinates: Some(Coordinates {
                latitude: lat,
                longitude: lon,
            }),
            operator: "Residential ISP".into(),
        }
    }

    fn clean_fingerprint(country: &str, lat: f64, lon: f64) -> Fingerprint {
        Fingerprint {
            device: web_device(),
            location: location_at(country, lat, lon),
            anonymity: AnonymityFlags::default(),
        }
    }

    fn observation(
        country: &str,
        lat: f64,
        lon: f64,
        created_at: DateTime<Utc>,
    ) -> SessionObservation {
        SessionObservation {
            created_at,
            country: Some(country.into()),
            coordinates: Some(Coordinates {
                latitude: lat,
                longitude: lon,
            }),
            device_type: "web".into(),
        }
    }

    fn midday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_clean_login_is_baseline() {
        let fp = clean_fingerprint("India", 28.6, 77.2);
        let result = score(&fp, &[], midday());

        assert_eq!(result.score, 0);
        assert_eq!(result.level, RiskLevel::Low);
        assert!(!result.requires_verification);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn test_vpn_proxy_tor_points() {
        let mut fp = clean_fingerprint("India", 28.6, 77.2);
        fp.anonymity = AnonymityFlags {
            is_vpn: true,
            is_proxy: true,
            is_tor: true,
        };
        let result = score(&fp, &[], midday());

        assert_eq!(result.score, 65);
        assert_eq!(result.level, RiskLevel::High);
        assert!(result.requires_verification);
    }

    #[test]
    fn test_impossible_travel_1500km_3h() {
        let at = midday();
        // Roughly 1500 km north of the previous login.
        let fp = clean_fingerprint("India", 42.1, 77.2);
        let history = vec![observation("India", 28.6, 77.2, at - chrono::Duration::hours(3))];

        let result = score(&fp, &history, at);

        assert!(result.factors.iter().any(|f| f == "Impossible travel detected"));
        assert_eq!(result.score, 25);
    }

    #[test]
    fn test_delhi_to_london_two_hours() {
        let at = midday();
        let fp = clean_fingerprint("United Kingdom", 51.5, -0.1);
        let history = vec![observation("India", 28.6, 77.2, at - chrono::Duration::hours(2))];

        let result = score(&fp, &history, at);

        // ~6700 km in 2 h hits the impossible-travel branch, plus the
        // independent country change.
        assert!(result.factors.iter().any(|f| f == "Impossible travel detected"));
        assert!(result.factors.iter().any(|f| f == "Login from a new country"));
        assert!(result.score >= 35);
        assert!(result.level >= RiskLevel::Medium);
    }

    #[test]
    fn test_repeat_login_same_place_stays_low() {
        let at = midday();
        let fp = clean_fingerprint("India", 28.6, 77.2);
        let history = vec![observation(
            "India",
            28.6,
            77.2,
            at - chrono::Duration::minutes(40),
        )];

        let result = score(&fp, &history, at);

        assert_eq!(result.score, 0);
        assert_eq!(result.level, RiskLevel::Low);
    }

    #[test]
    fn test_rapid_location_change_branch() {
        let at = midday();
        // ~620 km away (Delhi to roughly Jaipur-and-beyond scale), 1 h apart.
        let fp = clean_fingerprint("India", 23.0, 77.2);
        let history = vec![observation("India", 28.6, 77.2, at - chrono::Duration::hours(1))];

        let result = score(&fp, &history, at);

        assert!(result.factors.iter().any(|f| f == "Rapid location change"));
        assert!(!result.factors.iter().any(|f| f == "Impossible travel detected"));
        assert_eq!(result.score, 15);
    }

    #[test]
    fn test_country_change_without_coordinates() {
        let at = midday();
        let mut fp = clean_fingerprint("France", 48.8, 2.3);
        fp.location.coordinates = None;
        let history = vec![observation("India", 28.6, 77.2, at - chrono::Duration::days(2))];

        let result = score(&fp, &history, at);

        assert_eq!(result.score, 10);
        assert!(result.factors.iter().any(|f| f == "Login from a new country"));
    }

    #[test]
    fn test_unknown_country_never_counts_as_change() {
        let at = midday();
        let mut fp = clean_fingerprint("Unknown", 28.6, 77.2);
        fp.location.coordinates = None;
        let history = vec![observation("India", 28.6, 77.2, at - chrono::Duration::days(2))];

        let result = score(&fp, &history, at);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_late_night_hour_in_location_timezone() {
        // 22:00 UTC is 03:30 the next day in Kolkata.
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 22, 0, 0).unwrap();
        let mut fp = clean_fingerprint("India", 28.6, 77.2);
        fp.location.timezone = "Asia/Kolkata".into();

        let result = score(&fp, &[], at);

        assert_eq!(result.score, 5);
        assert!(result.factors.iter().any(|f| f == "Unusual login hour"));
    }

    #[test]
    fn test_score_clamped_at_100() {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 3, 0, 0).unwrap();
        let fp = Fingerprint {
            device: DeviceInfo {
                device_type: DeviceType::Unknown,
                os: "Unknown".into(),
                app: "Unknown".into(),
                raw: String::new(),
            },
            location: location_at("United Kingdom", 51.5, -0.1),
            anonymity: AnonymityFlags {
                is_vpn: true,
                is_proxy: true,
                is_tor: true,
            },
        };
        let history = vec![observation("India", 28.6, 77.2, at - chrono::Duration::hours(1))];

        let result = score(&fp, &history, at);

        assert_eq!(result.score, 100);
        assert_eq!(result.level, RiskLevel::High);
        assert!(result.requires_verification);
        assert!(
            result
                .recommendations
                .iter()
                .any(|r| r == "Require immediate step-up verification")
        );
        assert!(
            result
                .recommendations
                .iter()
                .any(|r| r == "Block the connection or require enhanced verification")
        );
    }

    #[test]
    fn test_tor_recommendation_without_escalation() {
        let mut fp = clean_fingerprint("India", 28.6, 77.2);
        fp.anonymity.is_tor = true;

        let result = score(&fp, &[], midday());

        assert_eq!(result.score, 30);
        assert!(!result.requires_verification);
        assert!(
            result
                .recommendations
                .iter()
                .any(|r| r.contains("enhanced verification"))
        );
    }
}
