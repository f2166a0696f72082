use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ClickLog, NewClickLog, ShortLink};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short identifier already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables, indexes).
    async fn init(&self) -> Result<()>;

    /// Create a new short link with a caller-provided identifier.
    async fn create_with_id(
        &self,
        short_id: &str,
        original_url: &str,
        owner_id: Option<&str>,
    ) -> StorageResult<ShortLink>;

    /// Fetch a short link by identifier.
    async fn get(&self, short_id: &str) -> Result<Option<ShortLink>>;

    /// Whether a short identifier is already taken.
    async fn exists(&self, short_id: &str) -> Result<bool>;

    /// Atomically increment the click counter. Must not lose updates under
    /// concurrent redirects for the same identifier.
    async fn increment_clicks(&self, short_id: &str) -> Result<()>;

    /// Delete a short link and cascade deletion of its click logs.
    /// Returns false when the identifier is unknown.
    async fn delete(&self, short_id: &str) -> Result<bool>;

    /// All short links created by `owner_id`.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>>;

    /// Persist one click log.
    async fn insert_click_log(&self, log: &NewClickLog) -> Result<()>;

    /// Click logs for a short identifier, newest first.
    async fn click_logs(&self, short_id: &str) -> Result<Vec<ClickLog>>;

    /// Number of click logs recorded for a short identifier.
    async fn count_click_logs(&self, short_id: &str) -> Result<i64>;
}
