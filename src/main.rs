use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use lariat::api;
use lariat::auth::AuthService;
use lariat::config::Config;
use lariat::geo::{
    provider::{GeoProvider, IpApi, IpInfo, MaxMindWeb},
    GeoCache, GeoResolver, LocalGeoDb,
};
use lariat::redirect;
use lariat::storage::{SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    let storage: Arc<dyn Storage> =
        Arc::new(SqliteStorage::new(&config.database.url, 10).await?);
    info!("Using SQLite storage: {}", config.database.url);

    storage.init().await?;
    info!("Database initialized successfully");

    let auth = Arc::new(AuthService::new(&config.auth.jwt_secret));

    let resolver = Arc::new(build_resolver(&config));

    let api_router = api::create_api_router(
        Arc::clone(&storage),
        auth,
        config.base_url.clone(),
    );
    let redirect_router = redirect::create_redirect_router(Arc::clone(&storage), resolver);

    let app = axum::Router::new()
        .nest("/api/urls", api_router)
        .merge(redirect_router)
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Redirects served at http://{}/{{shortId}}", addr);
    info!("   - API available at http://{}/api/urls/...", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn build_resolver(config: &Config) -> GeoResolver {
    let cache = GeoCache::new(
        Duration::from_secs(config.geo.cache_ttl_secs),
        10_000,
    );

    // A missing or unreadable database only costs provider lookups; it never
    // blocks startup.
    let local_db = config.geo.mmdb_path.as_deref().and_then(|path| {
        match LocalGeoDb::open(path) {
            Ok(db) => {
                info!("Offline geolocation database loaded from {}", path);
                Some(db)
            }
            Err(err) => {
                warn!(error = %err, "continuing without offline geolocation database");
                None
            }
        }
    });

    let client = reqwest::Client::new();
    let providers: Vec<Arc<dyn GeoProvider>> = vec![
        Arc::new(IpInfo::new(client.clone(), config.geo.ipinfo_token.clone())),
        Arc::new(IpApi::new(client.clone())),
        Arc::new(MaxMindWeb::new(client, config.geo.maxmind_token.clone())),
    ];

    if config.geo.maxmind_token.is_none() {
        info!("MAXMIND_TOKEN not set, the geolite provider will be skipped");
    }

    GeoResolver::new(cache, local_db, providers)
}
