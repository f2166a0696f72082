//! Time-bounded cache for resolved client locations.

use std::time::Duration;

use moka::future::Cache;

use super::GeoLocation;

/// Process-local, best-effort cache mapping client address to resolved
/// location. Entries expire a fixed TTL after insertion regardless of read
/// frequency; losing the cache only costs extra lookups.
#[derive(Clone)]
pub struct GeoCache {
    inner: Cache<String, GeoLocation>,
}

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Namespaces geolocation entries apart from any other cache use of the
/// same address strings.
const KEY_PREFIX: &str = "geo-";

impl GeoCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Look up a cached location. A stored entry only counts as a hit when
    /// both country and city are non-empty; anything else is a miss.
    pub async fn get(&self, address: &str) -> Option<GeoLocation> {
        let location = self.inner.get(&Self::key(address)).await?;
        if location.country.is_empty() || location.city.is_empty() {
            return None;
        }
        Some(location)
    }

    pub async fn put(&self, address: &str, location: GeoLocation) {
        self.inner.insert(Self::key(address), location).await;
    }

    fn key(address: &str) -> String {
        format!("{KEY_PREFIX}{address}")
    }
}

impl Default for GeoCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, 10_000)
    }
}
