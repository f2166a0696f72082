//! The redirect pipeline: lookup, durable click-count increment, context
//! capture, geolocation, best-effort click-log persistence, redirect.
//!
//! Failure isolation is the point of this handler. Once the target URL is
//! known, only a failed count increment may abort the pipeline; everything
//! downstream of it is absorbed and the visitor is redirected regardless.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::{extract_client_address, parse_user_agent};
use crate::geo::GeoResolver;
use crate::models::NewClickLog;
use crate::storage::Storage;

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
    pub resolver: Arc<GeoResolver>,
}

/// Resolve a short identifier and redirect to the stored URL.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(short_id): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    // LOOKUP
    let link = match state.storage.get(&short_id).await {
        Ok(Some(link)) => link,
        Ok(None) => return (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(err) => {
            tracing::error!(short_id = %short_id, error = %err, "short link lookup failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
        }
    };

    // UPDATE_COUNT — must be durable before the response; its failure is the
    // only one allowed to downgrade the redirect to a server error.
    if let Err(err) = state.storage.increment_clicks(&short_id).await {
        tracing::error!(short_id = %short_id, error = %err, "click count increment failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
    }

    // CAPTURE_CONTEXT → RESOLVE_GEO → PERSIST_LOG, all best-effort.
    record_click(&state, &short_id, &headers, addr).await;

    // REDIRECT_RESPONSE
    (
        StatusCode::FOUND,
        [(header::LOCATION, link.original_url)],
    )
        .into_response()
}

/// Gather client context, resolve its location and persist one click log.
/// Absorbs every failure; on an insert failure one minimal defaulted payload
/// is retried, then the log is abandoned.
async fn record_click(
    state: &RedirectState,
    short_id: &str,
    headers: &HeaderMap,
    addr: SocketAddr,
) {
    let client_address = extract_client_address(headers, Some(addr.ip()));

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let agent = parse_user_agent(user_agent);

    let location = state.resolver.resolve(&client_address).await;
    let timestamp = chrono::Utc::now().timestamp();

    let log = NewClickLog {
        short_id: short_id.to_string(),
        client_address,
        country: location.country,
        city: location.city,
        device: agent.device,
        browser: agent.browser,
        operating_system: agent.operating_system,
        timestamp,
    };

    if let Err(err) = state.storage.insert_click_log(&log).await {
        tracing::warn!(short_id = %short_id, error = %err, "click log write failed, retrying with minimal payload");
        let fallback = NewClickLog::minimal(short_id, timestamp);
        if let Err(err) = state.storage.insert_click_log(&fallback).await {
            tracing::warn!(short_id = %short_id, error = %err, "click log fallback write failed, dropping log");
        }
    }
}
