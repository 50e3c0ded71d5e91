//! Property-based tests for risk scoring.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use super::engine::score;
use super::geo::haversine_km;
use super::types::SessionObservation;
use crate::fingerprint::{
    AnonymityFlags, Coordinates, DeviceInfo, DeviceType, Fingerprint, Location,
};

fn latitude() -> impl Strategy<Value = f64> {
    -90.0f64..=90.0
}

fn longitude() -> impl Strategy<Value = f64> {
    -180.0f64..=180.0
}

fn coordinates() -> impl Strategy<Value = Coordinates> {
    (latitude(), longitude()).prop_map(|(latitude, longitude)| Coordinates {
        latitude,
        longitude,
    })
}

fn device_type() -> impl Strategy<Value = DeviceType> {
    prop_oneof![
        Just(DeviceType::Mobile),
        Just(DeviceType::Tablet),
        Just(DeviceType::Desktop),
        Just(DeviceType::Web),
        Just(DeviceType::Unknown),
    ]
}

fn anonymity() -> impl Strategy<Value = AnonymityFlags> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(is_vpn, is_proxy, is_tor)| {
        AnonymityFlags {
            is_vpn,
            is_proxy,
            is_tor,
        }
    })
}

fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    (
        device_type(),
        prop::option::of(coordinates()),
        anonymity(),
        "[A-Za-z0-9 /.();]{0,64}",
        prop_oneof![
            Just("India".to_string()),
            Just("United Kingdom".to_string()),
            Just("Unknown".to_string())
        ],
    )
        .prop_map(|(dt, coords, anonymity, raw, country)| Fingerprint {
            device: DeviceInfo {
                device_type: dt,
                os: "Test".into(),
                app: "Test".into(),
                raw,
            },
            location: Location {
                ip: "203.0.113.9".into(),
                country,
                country_code: "XX".into(),
                region: "Region".into(),
                city: "City".into(),
                timezone: "UTC".into(),
                coordinates: coords,
                operator: String::new(),
            },
            anonymity,
        })
}

fn event_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..2_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn history() -> impl Strategy<Value = Vec<SessionObservation>> {
    prop::collection::vec(
        (
            0i64..2_000_000_000,
            prop::option::of(coordinates()),
            prop::option::of(prop_oneof![
                Just("India".to_string()),
                Just("United Kingdom".to_string())
            ]),
        )
            .prop_map(|(secs, coordinates, country)| SessionObservation {
                created_at: Utc.timestamp_opt(secs, 0).unwrap(),
                country,
                coordinates,
                device_type: "web".into(),
            }),
        0..4,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For all inputs, the score stays within [0, 100].
    #[test]
    fn prop_score_is_bounded(
        fp in fingerprint(),
        hist in history(),
        at in event_time(),
    ) {
        let result = score(&fp, &hist, at);
        prop_assert!(result.score <= 100);
    }

    /// Identical inputs always produce identical output.
    #[test]
    fn prop_score_is_deterministic(
        fp in fingerprint(),
        hist in history(),
        at in event_time(),
    ) {
        let first = score(&fp, &hist, at);
        let second = score(&fp, &hist, at);
        prop_assert_eq!(first, second);
    }

    /// Verification is required exactly when the score crosses 50.
    #[test]
    fn prop_verification_tracks_threshold(
        fp in fingerprint(),
        hist in history(),
        at in event_time(),
    ) {
        let result = score(&fp, &hist, at);
        prop_assert_eq!(result.requires_verification, result.score > 50);
    }

    /// Haversine distance is symmetric.
    #[test]
    fn prop_haversine_symmetric(a in coordinates(), b in coordinates()) {
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);
        prop_assert!((ab - ba).abs() < 1e-6, "ab={ab} ba={ba}");
    }

    /// Distance from a point to itself is zero.
    #[test]
    fn prop_haversine_self_is_zero(a in coordinates()) {
        prop_assert!(haversine_km(a, a).abs() < 1e-9);
    }

    /// Distance is non-negative and bounded by half the Earth's circumference.
    #[test]
    fn prop_haversine_bounded(a in coordinates(), b in coordinates()) {
        let d = haversine_km(a, b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= 20_100.0, "got {d}");
    }
}
