//! Location resolution and anonymity detection.
//!
//! Private and loopback ranges short-circuit to a local pseudo-location.
//! Everything else goes through the [`GeoLookup`] collaborator; a failed
//! lookup degrades to an unknown location and never fails the caller.
//! VPN/proxy/Tor detection is keyword matching against the resolved
//! network-operator string: best-effort, with false negatives and
//! positives.

use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{AnonymityFlags, Coordinates, Location};

/// Keywords that mark a VPN or hosting-provider operator.
const VPN_KEYWORDS: &[&str] = &[
    "vpn",
    "hosting",
    "datacenter",
    "data center",
    "cloud",
    "aws",
    "amazon",
    "azure",
    "google cloud",
    "digitalocean",
    "ovh",
    "hetzner",
    "linode",
];

/// Keywords that mark a proxy operator.
const PROXY_KEYWORDS: &[&str] = &["proxy", "squid", "nginx"];

/// Keywords that mark a Tor operator.
const TOR_KEYWORDS: &[&str] = &["tor", "onion", "relay", "exit node"];

/// Errors from the external geolocation collaborator.
///
/// These never propagate out of [`resolve_location`]; they exist so lookup
/// implementations can report what went wrong to the logs.
#[derive(Debug, Error)]
pub enum GeoLookupError {
    /// The lookup did not answer within its deadline.
    #[error("geolocation lookup timed out")]
    Timeout,

    /// The lookup service failed or was unreachable.
    #[error("geolocation lookup unavailable: {0}")]
    Unavailable(String),

    /// The lookup answered with something unparseable.
    #[error("malformed geolocation response: {0}")]
    Malformed(String),
}

/// Raw answer from a geolocation lookup.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    /// Country name.
    pub country: String,
    /// ISO country code.
    pub country_code: String,
    /// Region or state.
    pub region: String,
    /// City.
    pub city: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Network-operator / ISP string.
    pub operator: String,
}

/// External geolocation collaborator.
///
/// Implementations must bound their own lookup time; callers treat any
/// error as a degraded (unknown) location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Resolves a public network address to a coarse location.
    async fn resolve(&self, ip: &str) -> Result<ResolvedLocation, GeoLookupError>;
}

/// Returns true for addresses that never leave the local network.
///
/// Covers RFC1918 ranges (10/8, 172.16/12, 192.168/16), loopback (127/8,
/// `::1`), and the literal `localhost`.
#[must_use]
pub fn is_private_address(ip: &str) -> bool {
    if ip.eq_ignore_ascii_case("localhost") {
        return true;
    }
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_loopback(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback(),
        Err(_) => false,
    }
}

/// Resolves a network address to a [`Location`].
///
/// Never returns an error: private addresses map to the local
/// pseudo-location and lookup failures map to unknown.
pub async fn resolve_location(ip: &str, geo: &dyn GeoLookup) -> Location {
    if is_private_address(ip) {
        return Location::local(ip);
    }

    match geo.resolve(ip).await {
        Ok(resolved) => {
            let coordinates = match (resolved.latitude, resolved.longitude) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            };
            Location {
                ip: ip.to_string(),
                country: non_empty_or(resolved.country, "Unknown"),
                country_code: non_empty_or(resolved.country_code, "--"),
                region: non_empty_or(resolved.region, "Unknown"),
                city: non_empty_or(resolved.city, "Unknown"),
                timezone: non_empty_or(resolved.timezone, "UTC"),
                coordinates,
                operator: resolved.operator,
            }
        }
        // Lookup implementations log their own failures; the fingerprint
        // still gets built.
        Err(_) => Location::unknown(ip),
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Derives anonymity indicators from a network-operator string.
#[must_use]
pub fn detect_anonymity(operator: &str) -> AnonymityFlags {
    let lower = operator.to_lowercase();
    if lower.is_empty() {
        return AnonymityFlags::default();
    }

    AnonymityFlags {
        is_vpn: VPN_KEYWORDS.iter().any(|k| lower.contains(k)),
        is_proxy: PROXY_KEYWORDS.iter().any(|k| lower.contains(k)),
        is_tor: TOR_KEYWORDS.iter().any(|k| lower.contains(k)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10.0.0.1", true)]
    #[case("172.16.0.1", true)]
    #[case("172.31.255.254", true)]
    #[case("192.168.1.5", true)]
    #[case("127.0.0.1", true)]
    #[case("::1", true)]
    #[case("localhost", true)]
    #[case("8.8.8.8", false)]
    #[case("172.32.0.1", false)]
    #[case("not-an-ip", false)]
    fn test_private_address_detection(#[case] ip: &str, #[case] expected: bool) {
        assert_eq!(is_private_address(ip), expected);
    }

    #[test]
    fn test_vpn_keywords() {
        let flags = detect_anonymity("NordVPN Hosting");
        assert!(flags.is_vpn);
        assert!(!flags.is_proxy);
        assert!(!flags.is_tor);
    }

    #[test]
    fn test_tor_keywords() {
        let flags = detect_anonymity("Tor Exit Relay");
        assert!(flags.is_tor);
    }

    #[test]
    fn test_residential_isp_clean() {
        let flags = detect_anonymity("Bharti Airtel Broadband");
        assert!(!flags.is_vpn);
        assert!(!flags.is_proxy);
        assert!(!flags.is_tor);
    }

    #[test]
    fn test_empty_operator_clean() {
        assert_eq!(detect_anonymity(""), AnonymityFlags::default());
    }

    #[tokio::test]
    async fn test_unknown_location_on_timeout() {
        let mut geo = MockGeoLookup::new();
        geo.expect_resolve()
            .returning(|_| Err(GeoLookupError::Timeout));

        let location = resolve_location("203.0.113.9", &geo).await;
        assert_eq!(location, Location::unknown("203.0.113.9"));
    }

    #[tokio::test]
    async fn test_blank_fields_fall_back() {
        let mut geo = MockGeoLookup::new();
        geo.expect_resolve().returning(|_| {
            Ok(ResolvedLocation {
                country: String::new(),
                country_code: String::new(),
                region: "  ".into(),
                city: "Delhi".into(),
                timezone: String::new(),
                latitude: Some(28.6),
                longitude: None,
                operator: "Jio".into(),
            })
        });

        let location = resolve_location("203.0.113.9", &geo).await;
        assert_eq!(location.country, "Unknown");
        assert_eq!(location.region, "Unknown");
        assert_eq!(location.city, "Delhi");
        assert_eq!(location.timezone, "UTC");
        // A lone latitude without longitude is not usable.
        assert!(location.coordinates.is_none());
    }
}
