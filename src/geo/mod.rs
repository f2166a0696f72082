//! IP geolocation pipeline: private-range classification, a TTL cache, an
//! optional offline MMDB, and an ordered chain of remote providers.
//!
//! The resolver never fails its caller; every internal failure degrades to
//! partial or "Unknown" data so the redirect path stays unaffected.

pub mod cache;
pub mod local;
pub mod private;
pub mod provider;
pub mod resolver;

use serde::{Deserialize, Serialize};

/// Resolved location for a client address. Both fields are always non-empty
/// once a `GeoResolver` has produced the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    pub city: String,
}

impl GeoLocation {
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
        }
    }

    /// Returned for loopback/private/empty addresses without touching the
    /// cache or any provider.
    pub fn private_network() -> Self {
        Self::new("Private Network", "Local")
    }

    /// Terminal fallback when the local database and every provider failed
    /// or was skipped.
    pub fn unknown() -> Self {
        Self::new("Unknown", "Unknown")
    }
}

pub use cache::GeoCache;
pub use local::LocalGeoDb;
pub use provider::{GeoProvider, ProviderError};
pub use resolver::GeoResolver;
