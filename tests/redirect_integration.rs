//! Redirect pipeline integration tests.
//!
//! The geolocation resolver is constructed with no local database and no
//! providers, which is exactly the "every provider fails or is skipped"
//! condition: redirects and click counting must be unaffected by it.

mod common;

use axum::http::{header, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use common::{create_test_storage, get_request, TestConnectInfoLayer};
use lariat::geo::GeoResolver;
use lariat::redirect;
use lariat::storage::Storage;

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn redirect_app(storage: Arc<dyn Storage>) -> axum::Router {
    redirect::create_redirect_router(storage, Arc::new(GeoResolver::disabled()))
        .layer(TestConnectInfoLayer)
}

#[tokio::test]
async fn known_id_redirects_to_the_stored_url() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com/destination", None)
        .await
        .unwrap();

    let app = redirect_app(storage.clone());
    let response = app
        .oneshot(get_request("/abc123", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/destination"
    );
}

#[tokio::test]
async fn each_redirect_increments_the_click_count_exactly_once() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();

    let app = redirect_app(storage.clone());
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get_request("/abc123", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    let link = storage.get("abc123").await.unwrap().unwrap();
    assert_eq!(link.clicks, 3);
}

#[tokio::test]
async fn unknown_id_is_a_404_with_no_side_effects() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();

    let app = redirect_app(storage.clone());
    let response = app.oneshot(get_request("/missing", &[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(storage.count_click_logs("missing").await.unwrap(), 0);
    let link = storage.get("abc123").await.unwrap().unwrap();
    assert_eq!(link.clicks, 0);
}

#[tokio::test]
async fn a_click_log_captures_address_device_and_browser() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();

    let app = redirect_app(storage.clone());
    let request = get_request(
        "/abc123",
        &[
            ("x-forwarded-for", "203.0.113.5, 10.0.0.2"),
            ("user-agent", CHROME_UA),
        ],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let logs = storage.click_logs("abc123").await.unwrap();
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.client_address, "203.0.113.5");
    assert_eq!(log.device, "Desktop");
    assert_eq!(log.browser, "Chrome");
    // No local database and no providers configured: geolocation degrades.
    assert_eq!(log.country, "Unknown");
    assert_eq!(log.city, "Unknown");
}

#[tokio::test]
async fn private_chain_logs_a_private_network_location() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();

    let app = redirect_app(storage.clone());
    let request = get_request("/abc123", &[("x-forwarded-for", "10.0.0.1, 10.0.0.2")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let logs = storage.click_logs("abc123").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].client_address, "10.0.0.1");
    assert_eq!(logs[0].country, "Private Network");
    assert_eq!(logs[0].city, "Local");
}

#[tokio::test]
async fn missing_user_agent_defaults_to_desktop_and_unknown() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();

    let app = redirect_app(storage.clone());
    let response = app.oneshot(get_request("/abc123", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let logs = storage.click_logs("abc123").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].device, "Desktop");
    assert_eq!(logs[0].browser, "Unknown");
    assert_eq!(logs[0].operating_system, "Unknown");
}
