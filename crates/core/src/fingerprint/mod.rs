//! Device and location fingerprinting.
//!
//! A fingerprint is the combination of coarse device classification,
//! resolved location, and anonymity indicators computed for a session at
//! creation time. Classification is substring-based and location detection
//! is keyword-based; both are best-effort heuristics, not authoritative.
//! Fingerprinting never fails: lookup errors degrade to an unknown
//! location.

mod device;
mod location;
mod types;

pub use device::classify_device;
pub use location::{
    GeoLookup, GeoLookupError, ResolvedLocation, detect_anonymity, is_private_address,
    resolve_location,
};
pub use types::{
    AnonymityFlags, Coordinates, DeviceInfo, DeviceType, Fingerprint, Location, LoginMethod,
};

/// Builds a complete fingerprint for a new session.
///
/// Combines device classification of `raw_client` with location resolution
/// of `ip` through the supplied lookup collaborator. Private and loopback
/// addresses short-circuit to a local pseudo-location without touching the
/// lookup.
pub async fn fingerprint(raw_client: &str, ip: &str, geo: &dyn GeoLookup) -> Fingerprint {
    let device = classify_device(raw_client);
    let location = resolve_location(ip, geo).await;
    let anonymity = detect_anonymity(&location.operator);

    Fingerprint {
        device,
        location,
        anonymity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use location::MockGeoLookup;

    #[tokio::test]
    async fn test_private_address_short_circuits_lookup() {
        // The mock panics on any call; a private address must not reach it.
        let geo = MockGeoLookup::new();

        let fp = fingerprint("Mozilla/5.0 (Windows NT 10.0)", "192.168.1.5", &geo).await;

        assert_eq!(fp.location.country, "Local");
        assert!(!fp.anonymity.is_vpn);
        assert!(!fp.anonymity.is_proxy);
        assert!(!fp.anonymity.is_tor);
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_unknown() {
        let mut geo = MockGeoLookup::new();
        geo.expect_resolve()
            .returning(|_| Err(GeoLookupError::Unavailable("boom".into())));

        let fp = fingerprint("Mozilla/5.0", "203.0.113.9", &geo).await;

        assert_eq!(fp.location.country, "Unknown");
        assert!(!fp.anonymity.is_vpn);
        assert!(!fp.anonymity.is_tor);
    }

    #[tokio::test]
    async fn test_vpn_operator_flagged() {
        let mut geo = MockGeoLookup::new();
        geo.expect_resolve().returning(|_| {
            Ok(ResolvedLocation {
                country: "Netherlands".into(),
                country_code: "NL".into(),
                region: "North Holland".into(),
                city: "Amsterdam".into(),
                timezone: "Europe/Amsterdam".into(),
                latitude: Some(52.37),
                longitude: Some(4.89),
                operator: "NordVPN Hosting".into(),
            })
        });

        let fp = fingerprint("Mozilla/5.0", "203.0.113.9", &geo).await;

        assert!(fp.anonymity.is_vpn);
        assert!(!fp.anonymity.is_tor);
        assert_eq!(fp.location.country_code, "NL");
    }
}
