use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Base URL used to build absolute short links in shorten responses.
    pub base_url: String,
    pub geo: GeoConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Optional path to a MaxMind MMDB file for offline lookups.
    pub mmdb_path: Option<String>,
    /// ipinfo.io token. The provider is attempted without one, rate-limited.
    pub ipinfo_token: Option<String>,
    /// MaxMind web service token. Absence skips that provider entirely.
    pub maxmind_token: Option<String>,
    /// Geolocation cache TTL in seconds.
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HS256 bearer tokens on owner-scoped endpoints.
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./lariat.db".to_string());

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let mmdb_path = std::env::var("GEOIP_DB_PATH").ok();
        let ipinfo_token = std::env::var("IPINFO_TOKEN").ok().filter(|t| !t.is_empty());
        let maxmind_token = std::env::var("MAXMIND_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let cache_ttl_secs = std::env::var("GEO_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(24 * 60 * 60);

        let jwt_secret =
            std::env::var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET must be set")?;

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig { url: database_url },
            base_url,
            geo: GeoConfig {
                mmdb_path,
                ipinfo_token,
                maxmind_token,
                cache_ttl_secs,
            },
            auth: AuthConfig { jwt_secret },
        })
    }
}
