//! Fingerprint data types.

use serde::{Deserialize, Serialize};

/// Maximum length of the stored raw client-identifier string.
pub const MAX_RAW_CLIENT_LEN: usize = 256;

/// Coarse device classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Phone-class device.
    Mobile,
    /// Tablet-class device.
    Tablet,
    /// Desktop application.
    Desktop,
    /// Browser session.
    Web,
    /// Could not be classified.
    Unknown,
}

impl DeviceType {
    /// Returns the lowercase string form used in storage and responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
            Self::Web => "web",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for DeviceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            "web" => Ok(Self::Web),
            "unknown" => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

/// How the user authenticated when the session was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    /// Email and password.
    Password,
    /// One-time passcode.
    Otp,
    /// Third-party identity provider.
    Social,
    /// Device biometric unlock.
    Biometric,
}

impl LoginMethod {
    /// Returns the lowercase string form used in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Otp => "otp",
            Self::Social => "social",
            Self::Biometric => "biometric",
        }
    }
}

/// Parsed device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Coarse device type.
    pub device_type: DeviceType,
    /// Operating system name, with version where extractable.
    pub os: String,
    /// Browser or application name.
    pub app: String,
    /// Raw client-identifier string, truncated for storage.
    pub raw: String,
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Resolved session location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Network address the session originated from.
    pub ip: String,
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
    /// Coarse coordinates, when the lookup provides them.
    pub coordinates: Option<Coordinates>,
    /// Network-operator string reported by the lookup.
    pub operator: String,
}

impl Location {
    /// Pseudo-location for private and loopback addresses.
    #[must_use]
    pub fn local(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            country: "Local".to_string(),
            country_code: "--".to_string(),
            region: "Local".to_string(),
            city: "Local".to_string(),
            timezone: "UTC".to_string(),
            coordinates: None,
            operator: String::new(),
        }
    }

    /// Fallback location when the lookup fails or returns nothing usable.
    #[must_use]
    pub fn unknown(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            country: "Unknown".to_string(),
            country_code: "--".to_string(),
            region: "Unknown".to_string(),
            city: "Unknown".to_string(),
            timezone: "UTC".to_string(),
            coordinates: None,
            operator: String::new(),
        }
    }
}

/// Anonymity indicators derived from the network-operator string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymityFlags {
    /// Operator string matched a VPN/hosting keyword.
    pub is_vpn: bool,
    /// Operator string matched a proxy keyword.
    pub is_proxy: bool,
    /// Operator string matched a Tor keyword.
    pub is_tor: bool,
}

/// Complete fingerprint computed for a session at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Parsed device information.
    pub device: DeviceInfo,
    /// Resolved location.
    pub location: Location,
    /// Anonymity indicators.
    pub anonymity: AnonymityFlags,
}
