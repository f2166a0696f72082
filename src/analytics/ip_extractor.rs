//! Client address extraction from proxy-related request headers.
//!
//! Walks the forwarding headers in order of specificity and prefers the
//! first publicly routable candidate, falling back to the transport-level
//! peer address. The result is a best guess: proxy chains can lie, and the
//! analytics pipeline treats the value accordingly.

use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::geo::private::is_private_address;

/// Headers checked after `x-forwarded-for`, each carrying a single address.
const SINGLE_ADDRESS_HEADERS: [&str; 2] = ["x-real-ip", "cf-connecting-ip"];

/// Derive the originating client address from `headers`, falling back to the
/// socket peer address and finally to a literal loopback. Never fails.
///
/// `x-forwarded-for` holds the proxy chain left to right; the first
/// non-private entry wins, and when every entry is private the leftmost one
/// is returned unmodified.
pub fn extract_client_address(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        let candidates: Vec<&str> = forwarded
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if let Some(public) = candidates
            .iter()
            .find(|candidate| !is_private_address(candidate))
        {
            return (*public).to_string();
        }
        if let Some(first) = candidates.first() {
            return (*first).to_string();
        }
    }

    for name in SINGLE_ADDRESS_HEADERS {
        if let Some(value) = header_str(headers, name) {
            let value = value.trim();
            if !value.is_empty() && !is_private_address(value) {
                return value.to_string();
            }
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
