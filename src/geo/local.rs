//! Offline geolocation lookup against a MaxMind MMDB file.
//!
//! Tried before any remote provider: fast and network-free, but the shipped
//! database can be stale or incomplete, so a miss here simply hands the
//! address to the provider chain.

use std::net::IpAddr;

use anyhow::{Context, Result};
use maxminddb::{geoip2, Reader};

use super::GeoLocation;

pub struct LocalGeoDb {
    reader: Reader<Vec<u8>>,
}

impl LocalGeoDb {
    /// Open the MMDB file at `path`. The database is optional at the
    /// deployment level; callers hold `Option<LocalGeoDb>`.
    pub fn open(path: &str) -> Result<Self> {
        let reader = Reader::open_readfile(path)
            .with_context(|| format!("failed to open geolocation database at {path}"))?;
        Ok(Self { reader })
    }

    /// Look up `address`. Returns a location only when the database yields a
    /// country; the city defaults to "Unknown" when absent.
    pub fn lookup(&self, address: &str) -> Option<GeoLocation> {
        let ip: IpAddr = address.parse().ok()?;
        let record: geoip2::City = self.reader.lookup(ip).ok()?;

        let country = record.country.as_ref().and_then(|c| {
            c.iso_code.map(str::to_string).or_else(|| {
                c.names
                    .as_ref()
                    .and_then(|names| names.get("en"))
                    .map(|s| s.to_string())
            })
        })?;

        let city = record
            .city
            .as_ref()
            .and_then(|c| c.names.as_ref())
            .and_then(|names| names.get("en"))
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Some(GeoLocation { country, city })
    }
}
