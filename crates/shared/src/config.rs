//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Session and alert security policy.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Geolocation lookup configuration.
    #[serde(default)]
    pub geo: GeoConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Session and alert security policy.
///
/// Thresholds are passed explicitly into the session and alert services so
/// the logic stays testable without process-environment coupling.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Default session lifetime in days when the caller supplies no expiry.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// Inactive sessions idle longer than this are removed by the sweep.
    #[serde(default = "default_inactive_retention_days")]
    pub inactive_retention_days: i64,
    /// Non-unread alerts older than this are removed by the sweep.
    #[serde(default = "default_alert_retention_days")]
    pub alert_retention_days: i64,
    /// Interval between maintenance sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_session_ttl_days() -> i64 {
    7
}

fn default_inactive_retention_days() -> i64 {
    30
}

fn default_alert_retention_days() -> i64 {
    90
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_session_ttl_days(),
            inactive_retention_days: default_inactive_retention_days(),
            alert_retention_days: default_alert_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Geolocation lookup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoConfig {
    /// Base URL of the IP geolocation endpoint.
    #[serde(default = "default_geo_endpoint")]
    pub endpoint: String,
    /// Lookup timeout in milliseconds. Lookups that exceed this degrade to
    /// an unknown location instead of failing the request.
    #[serde(default = "default_geo_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_geo_endpoint() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_geo_timeout_ms() -> u64 {
    2000
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geo_endpoint(),
            timeout_ms: default_geo_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CIVITRACK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_defaults() {
        let security = SecurityConfig::default();
        assert_eq!(security.session_ttl_days, 7);
        assert_eq!(security.inactive_retention_days, 30);
        assert_eq!(security.alert_retention_days, 90);
    }

    #[test]
    fn test_geo_defaults() {
        let geo = GeoConfig::default();
        assert_eq!(geo.timeout_ms, 2000);
        assert!(geo.endpoint.starts_with("http"));
    }
}
