//! Geolocation lookup backed by the ip-api.com HTTP service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use civitrack_core::fingerprint::{GeoLookup, GeoLookupError, ResolvedLocation};
use civitrack_shared::config::GeoConfig;

/// Geolocation client for the ip-api.com JSON endpoint.
///
/// The lookup is deliberately coarse: one GET per unseen address, a short
/// timeout, and any failure degrades to an unknown location upstream.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    client: Client,
    endpoint: String,
}

impl IpApiClient {
    /// Creates a lookup client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &GeoConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

/// Response shape of the ip-api.com JSON endpoint.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    country: String,
    #[serde(rename = "countryCode", default)]
    country_code: String,
    #[serde(rename = "regionName", default)]
    region: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    timezone: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    isp: String,
    #[serde(default)]
    org: String,
}

#[async_trait]
impl GeoLookup for IpApiClient {
    async fn resolve(&self, ip: &str) -> Result<ResolvedLocation, GeoLookupError> {
        let url = format!("{}/{ip}", self.endpoint);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeoLookupError::Timeout
            } else {
                GeoLookupError::Unavailable(e.to_string())
            }
        })?;

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| GeoLookupError::Malformed(e.to_string()))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| "lookup failed".to_string());
            warn!(%ip, %reason, "geolocation lookup rejected address");
            return Err(GeoLookupError::Unavailable(reason));
        }

        // ip-api reports the ISP and the owning organization separately;
        // prefer the ISP string for anonymity keyword matching.
        let operator = if body.isp.is_empty() { body.org } else { body.isp };

        Ok(ResolvedLocation {
            country: body.country,
            country_code: body.country_code,
            region: body.region,
            city: body.city,
            timezone: body.timezone,
            latitude: body.lat,
            longitude: body.lon,
            operator,
        })
    }
}
