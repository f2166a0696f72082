use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A shortened URL record. `short_id` is unique and immutable once assigned;
/// `clicks` only ever grows, one increment per resolved redirect.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub id: i64,
    pub short_id: String,
    pub original_url: String,
    pub clicks: i64,
    pub owner_id: Option<String>,
    pub created_at: i64,
}

/// One record per redirect attempt. Best-effort: a missing log does not mean
/// the redirect did not happen — `ShortLink::clicks` is the source of truth
/// for totals. Never mutated; deleted only with its parent link.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClickLog {
    pub id: i64,
    pub short_id: String,
    pub client_address: String,
    pub country: String,
    pub city: String,
    pub device: String,
    pub browser: String,
    pub operating_system: String,
    pub timestamp: i64,
}

/// Fields gathered by the redirect pipeline before a `ClickLog` is persisted.
#[derive(Debug, Clone)]
pub struct NewClickLog {
    pub short_id: String,
    pub client_address: String,
    pub country: String,
    pub city: String,
    pub device: String,
    pub browser: String,
    pub operating_system: String,
    pub timestamp: i64,
}

impl NewClickLog {
    /// Minimal defaulted payload used for the single fallback attempt when
    /// the full log insert fails.
    pub fn minimal(short_id: &str, timestamp: i64) -> Self {
        Self {
            short_id: short_id.to_string(),
            client_address: "127.0.0.1".to_string(),
            country: "Unknown".to_string(),
            city: "Unknown".to_string(),
            device: "Unknown".to_string(),
            browser: "Unknown".to_string(),
            operating_system: "Unknown".to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub original_url: String,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_id: String,
}
