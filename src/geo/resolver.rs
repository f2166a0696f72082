//! Layered geolocation resolution with a terminal safe default.

use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::GeoCache;
use super::local::LocalGeoDb;
use super::private::is_private_address;
use super::provider::GeoProvider;
use super::GeoLocation;

/// Resolves a client address to a best-effort location.
///
/// Order: private-range short circuit, cache, local offline database, then
/// each remote provider in turn. Every layer is allowed to fail; the caller
/// always receives a `GeoLocation`.
pub struct GeoResolver {
    cache: GeoCache,
    local_db: Option<LocalGeoDb>,
    providers: Vec<Arc<dyn GeoProvider>>,
}

impl GeoResolver {
    pub fn new(
        cache: GeoCache,
        local_db: Option<LocalGeoDb>,
        providers: Vec<Arc<dyn GeoProvider>>,
    ) -> Self {
        Self {
            cache,
            local_db,
            providers,
        }
    }

    /// A resolver with no local database and no providers; every non-private
    /// address resolves to {Unknown, Unknown}. Used by tests and as a safe
    /// stand-in when geolocation is not configured.
    pub fn disabled() -> Self {
        Self::new(GeoCache::default(), None, Vec::new())
    }

    pub async fn resolve(&self, address: &str) -> GeoLocation {
        if is_private_address(address) {
            return GeoLocation::private_network();
        }

        if let Some(hit) = self.cache.get(address).await {
            return hit;
        }

        if let Some(local) = self.local_db.as_ref() {
            if let Some(location) = local.lookup(address) {
                self.cache.put(address, location.clone()).await;
                return location;
            }
        }

        for provider in &self.providers {
            if !provider.is_configured() {
                debug!(provider = provider.name(), "skipping unconfigured provider");
                continue;
            }

            match provider.resolve(address).await {
                Ok(location) => {
                    self.cache.put(address, location.clone()).await;
                    return location;
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        address,
                        error = %err,
                        "geolocation provider failed"
                    );
                }
            }
        }

        GeoLocation::unknown()
    }
}
