//! Remote geolocation providers.
//!
//! Each provider carries its own endpoint, optional authentication token and
//! response shape, behind a common [`GeoProvider`] trait so the resolver can
//! walk them as an ordered fallback chain.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::GeoLocation;

/// Upper bound on a single provider call so a slow or dead service cannot
/// stall the redirect pipeline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

const USER_AGENT: &str = "lariat/1.0";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider reported failure: {0}")]
    FailureStatus(String),
    #[error("empty response body")]
    EmptyBody,
    #[error("no usable location in response")]
    NoResult,
}

/// One external geolocation service. Implementations must treat a missing or
/// "Unknown" country as [`ProviderError::NoResult`] so the resolver moves on.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this provider can be attempted at all. Providers that require
    /// an unconfigured token report `false` and are skipped entirely.
    fn is_configured(&self) -> bool {
        true
    }

    async fn resolve(&self, address: &str) -> Result<GeoLocation, ProviderError>;
}

async fn fetch_json(
    client: &reqwest::Client,
    url: String,
    query: &[(&str, &str)],
) -> Result<Value, ProviderError> {
    let response = client
        .get(url)
        .query(query)
        .timeout(REQUEST_TIMEOUT)
        .header("Accept", "application/json")
        .header("User-Agent", USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(ProviderError::EmptyBody);
    }
    serde_json::from_str(&body).map_err(|_| ProviderError::EmptyBody)
}

/// Pull a non-empty string field out of a JSON object.
fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn location_from(country: Option<String>, city: Option<String>) -> Result<GeoLocation, ProviderError> {
    let country = country.unwrap_or_else(|| "Unknown".to_string());
    if country == "Unknown" {
        return Err(ProviderError::NoResult);
    }
    Ok(GeoLocation {
        country,
        city: city.unwrap_or_else(|| "Unknown".to_string()),
    })
}

/// ipinfo.io — works without a token at a reduced rate limit, so it is
/// always attempted; the token is sent along when configured.
pub struct IpInfo {
    client: reqwest::Client,
    token: Option<String>,
}

impl IpInfo {
    pub fn new(client: reqwest::Client, token: Option<String>) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl GeoProvider for IpInfo {
    fn name(&self) -> &'static str {
        "ipinfo"
    }

    async fn resolve(&self, address: &str) -> Result<GeoLocation, ProviderError> {
        let url = format!("https://ipinfo.io/{address}/json");
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(token) = self.token.as_deref() {
            query.push(("token", token));
        }

        let body = fetch_json(&self.client, url, &query).await?;
        location_from(string_field(&body, "country"), string_field(&body, "city"))
    }
}

/// ip-api.com — free, no token. Failures are reported in-band through a
/// `status: "fail"` body rather than an HTTP error.
pub struct IpApi {
    client: reqwest::Client,
}

impl IpApi {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GeoProvider for IpApi {
    fn name(&self) -> &'static str {
        "ip-api"
    }

    async fn resolve(&self, address: &str) -> Result<GeoLocation, ProviderError> {
        let url = format!("http://ip-api.com/json/{address}");
        let body = fetch_json(&self.client, url, &[]).await?;

        if body.get("status").and_then(Value::as_str) == Some("fail") {
            let message = string_field(&body, "message").unwrap_or_default();
            return Err(ProviderError::FailureStatus(message));
        }

        location_from(string_field(&body, "country"), string_field(&body, "city"))
    }
}

/// MaxMind GeoLite web service. Requires an account token; skipped entirely
/// when none is configured.
pub struct MaxMindWeb {
    client: reqwest::Client,
    token: Option<String>,
}

impl MaxMindWeb {
    pub fn new(client: reqwest::Client, token: Option<String>) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl GeoProvider for MaxMindWeb {
    fn name(&self) -> &'static str {
        "geolite"
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn resolve(&self, address: &str) -> Result<GeoLocation, ProviderError> {
        let url = format!("https://geolite.info/geoip/v2.1/city/{address}");
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(token) = self.token.as_deref() {
            query.push(("token", token));
        }

        let body = fetch_json(&self.client, url, &query).await?;

        let country = body
            .pointer("/country/names/en")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let city = body
            .pointer("/city/names/en")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        location_from(country, city)
    }
}
