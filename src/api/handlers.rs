use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::aggregator::{self, DEFAULT_RECENT_LIMIT};
use crate::analytics::ClickSummary;
use crate::auth::{AuthError, AuthService};
use crate::models::{ShortLink, ShortenRequest, ShortenResponse};
use crate::storage::{Storage, StorageError};

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth: Arc<AuthService>,
    pub base_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Short link fields exposed by the analytics endpoint. `total_clicks` is
/// the authoritative counter from the record itself.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlInfo {
    pub original_url: String,
    pub short_id: String,
    pub total_clicks: i64,
    pub created_at: i64,
}

impl From<&ShortLink> for UrlInfo {
    fn from(link: &ShortLink) -> Self {
        Self {
            original_url: link.original_url.clone(),
            short_id: link.short_id.clone(),
            total_clicks: link.clicks,
            created_at: link.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub url: UrlInfo,
    pub analytics: ClickSummary,
}

/// A short link plus the click total derived from its logs. Divergence from
/// `clicks` signals click-log write failures, not a counting bug.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedLink {
    #[serde(flatten)]
    pub link: ShortLink,
    pub actual_clicks: i64,
}

const SHORT_ID_LEN: usize = 6;
const MAX_GENERATION_ATTEMPTS: usize = 10;

fn generate_short_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Absolute http/https/ftp URL with no spaces or quotes.
fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .or_else(|| url.strip_prefix("ftp://"));

    match rest {
        Some(rest) => !rest.is_empty() && !rest.contains(' ') && !rest.contains('"'),
        None => false,
    }
}

/// Create a shortened URL with a freshly generated, collision-checked
/// identifier.
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), ApiError> {
    if payload.original_url.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Original URL is required",
        ));
    }
    if !is_valid_url(&payload.original_url) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid URL format"));
    }

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let short_id = generate_short_id();
        match state
            .storage
            .create_with_id(&short_id, &payload.original_url, payload.owner_id.as_deref())
            .await
        {
            Ok(link) => {
                return Ok((
                    StatusCode::CREATED,
                    Json(ShortenResponse {
                        short_url: format!("{}/{}", state.base_url, link.short_id),
                        short_id: link.short_id,
                    }),
                ));
            }
            // Identifier collision: regenerate and try again.
            Err(StorageError::Conflict) => continue,
            Err(StorageError::Other(err)) => {
                tracing::error!(error = %err, "failed to create short link");
                return Err(api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to shorten URL",
                ));
            }
        }
    }

    Err(api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to generate a unique short identifier",
    ))
}

/// Analytics for one short identifier: the authoritative record plus grouped
/// views over its click logs.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(short_id): Path<String>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let link = match state.storage.get(&short_id).await {
        Ok(Some(link)) => link,
        Ok(None) => return Err(api_error(StatusCode::NOT_FOUND, "URL not found")),
        Err(err) => {
            tracing::error!(short_id = %short_id, error = %err, "analytics lookup failed");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch analytics",
            ));
        }
    };

    let logs = state.storage.click_logs(&short_id).await.map_err(|err| {
        tracing::error!(short_id = %short_id, error = %err, "click log fetch failed");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch analytics",
        )
    })?;

    let summary = aggregator::summarize(&logs, chrono::Utc::now(), DEFAULT_RECENT_LIMIT);

    Ok(Json(AnalyticsResponse {
        url: UrlInfo::from(&link),
        analytics: summary,
    }))
}

/// All links owned by a user, each with a log-derived `actualClicks` count
/// for cross-checking the authoritative counter.
pub async fn user_links(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<OwnedLink>>, ApiError> {
    let links = state.storage.list_by_owner(&owner_id).await.map_err(|err| {
        tracing::error!(owner_id = %owner_id, error = %err, "owner link listing failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user links")
    })?;

    let mut owned = Vec::with_capacity(links.len());
    for link in links {
        let actual_clicks = state
            .storage
            .count_click_logs(&link.short_id)
            .await
            .map_err(|err| {
                tracing::error!(short_id = %link.short_id, error = %err, "click log count failed");
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user links")
            })?;
        owned.push(OwnedLink {
            link,
            actual_clicks,
        });
    }

    Ok(Json(owned))
}

/// Delete a short link and cascade deletion of its click logs. Requires a
/// bearer token resolving to the record's owner.
pub async fn delete_url(
    State(state): State<Arc<AppState>>,
    Path(short_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let owner_id = state.auth.verify_bearer(&headers).map_err(|err| {
        let message = err.to_string();
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                api_error(StatusCode::UNAUTHORIZED, message)
            }
        }
    })?;

    let link = match state.storage.get(&short_id).await {
        Ok(Some(link)) => link,
        Ok(None) => return Err(api_error(StatusCode::NOT_FOUND, "URL not found")),
        Err(err) => {
            tracing::error!(short_id = %short_id, error = %err, "delete lookup failed");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete URL",
            ));
        }
    };

    if link.owner_id.as_deref() != Some(owner_id.as_str()) {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "Not authorized to delete this URL",
        ));
    }

    match state.storage.delete(&short_id).await {
        Ok(true) => Ok(Json(SuccessResponse {
            message: "URL deleted successfully".to_string(),
        })),
        Ok(false) => Err(api_error(StatusCode::NOT_FOUND, "URL not found")),
        Err(err) => {
            tracing::error!(short_id = %short_id, error = %err, "delete failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete URL",
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
