use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{ClickLog, NewClickLog, ShortLink};
use crate::storage::{Storage, StorageError, StorageResult};

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

fn unix_now() -> Result<i64, StorageError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| StorageError::Other(e.into()))?;
    Ok(now.as_secs() as i64)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_id TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                clicks INTEGER NOT NULL DEFAULT 0,
                owner_id TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_urls_short_id ON urls(short_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_urls_owner_id ON urls(owner_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS click_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_id TEXT NOT NULL,
                client_address TEXT NOT NULL,
                country TEXT NOT NULL,
                city TEXT NOT NULL,
                device TEXT NOT NULL,
                browser TEXT NOT NULL,
                operating_system TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_click_logs_short_id ON click_logs(short_id)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create_with_id(
        &self,
        short_id: &str,
        original_url: &str,
        owner_id: Option<&str>,
    ) -> StorageResult<ShortLink> {
        let created_at = unix_now()?;

        let result = sqlx::query(
            r#"
            INSERT INTO urls (short_id, original_url, owner_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(short_id) DO NOTHING
            "#,
        )
        .bind(short_id)
        .bind(original_url)
        .bind(owner_id)
        .bind(created_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        let link = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, short_id, original_url, clicks, owner_id, created_at
            FROM urls
            WHERE short_id = ?
            "#,
        )
        .bind(short_id)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        Ok(link)
    }

    async fn get(&self, short_id: &str) -> Result<Option<ShortLink>> {
        let link = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, short_id, original_url, clicks, owner_id, created_at
            FROM urls
            WHERE short_id = ?
            "#,
        )
        .bind(short_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn exists(&self, short_id: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM urls WHERE short_id = ?")
            .bind(short_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.is_some())
    }

    async fn increment_clicks(&self, short_id: &str) -> Result<()> {
        // Single-statement increment keeps concurrent redirects lossless.
        let result = sqlx::query("UPDATE urls SET clicks = clicks + 1 WHERE short_id = ?")
            .bind(short_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("unknown short identifier: {short_id}");
        }
        Ok(())
    }

    async fn delete(&self, short_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM urls WHERE short_id = ?")
            .bind(short_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM click_logs WHERE short_id = ?")
            .bind(short_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>> {
        let links = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, short_id, original_url, clicks, owner_id, created_at
            FROM urls
            WHERE owner_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn insert_click_log(&self, log: &NewClickLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO click_logs
                (short_id, client_address, country, city, device, browser,
                 operating_system, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.short_id)
        .bind(&log.client_address)
        .bind(&log.country)
        .bind(&log.city)
        .bind(&log.device)
        .bind(&log.browser)
        .bind(&log.operating_system)
        .bind(log.timestamp)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn click_logs(&self, short_id: &str) -> Result<Vec<ClickLog>> {
        let logs = sqlx::query_as::<_, ClickLog>(
            r#"
            SELECT id, short_id, client_address, country, city, device,
                   browser, operating_system, timestamp
            FROM click_logs
            WHERE short_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(short_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(logs)
    }

    async fn count_click_logs(&self, short_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM click_logs WHERE short_id = ?")
                .bind(short_id)
                .fetch_one(self.pool.as_ref())
                .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
        storage.init().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let storage = storage().await;
        let link = storage
            .create_with_id("abc123", "https://example.com", Some("user-1"))
            .await
            .unwrap();
        assert_eq!(link.short_id, "abc123");
        assert_eq!(link.clicks, 0);

        let fetched = storage.get("abc123").await.unwrap().unwrap();
        assert_eq!(fetched.original_url, "https://example.com");
        assert_eq!(fetched.owner_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn duplicate_short_id_is_a_conflict() {
        let storage = storage().await;
        storage
            .create_with_id("abc123", "https://example.com", None)
            .await
            .unwrap();

        let err = storage
            .create_with_id("abc123", "https://other.example", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn increment_is_reflected_in_get() {
        let storage = storage().await;
        storage
            .create_with_id("abc123", "https://example.com", None)
            .await
            .unwrap();

        storage.increment_clicks("abc123").await.unwrap();
        storage.increment_clicks("abc123").await.unwrap();

        let link = storage.get("abc123").await.unwrap().unwrap();
        assert_eq!(link.clicks, 2);
    }

    #[tokio::test]
    async fn increment_of_unknown_id_errors() {
        let storage = storage().await;
        assert!(storage.increment_clicks("nope").await.is_err());
    }

    #[tokio::test]
    async fn delete_cascades_click_logs() {
        let storage = storage().await;
        storage
            .create_with_id("abc123", "https://example.com", None)
            .await
            .unwrap();
        storage
            .insert_click_log(&NewClickLog::minimal("abc123", 1_700_000_000))
            .await
            .unwrap();
        assert_eq!(storage.count_click_logs("abc123").await.unwrap(), 1);

        assert!(storage.delete("abc123").await.unwrap());
        assert_eq!(storage.count_click_logs("abc123").await.unwrap(), 0);
        assert!(storage.get("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_returns_false() {
        let storage = storage().await;
        assert!(!storage.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn click_logs_come_back_newest_first() {
        let storage = storage().await;
        storage
            .create_with_id("abc123", "https://example.com", None)
            .await
            .unwrap();

        for ts in [100, 300, 200] {
            storage
                .insert_click_log(&NewClickLog::minimal("abc123", ts))
                .await
                .unwrap();
        }

        let logs = storage.click_logs("abc123").await.unwrap();
        let timestamps: Vec<i64> = logs.iter().map(|l| l.timestamp).collect();
        assert_eq!(timestamps, vec![300, 200, 100]);
    }
}
