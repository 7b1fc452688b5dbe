use crate::storage::cache::{CacheHit, CacheStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Cache entries in the `cache_entries` table, shared across processes.
#[derive(Debug, Clone)]
pub struct PgCacheStore {
    pool: sqlx::PgPool,
}

impl PgCacheStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CacheStore for PgCacheStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheHit>> {
        let row = sqlx::query_as::<_, (Value, DateTime<Utc>)>(
            "SELECT value, stored_at FROM cache_entries WHERE key = $1",
        )
        .persistent(false)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("select cache_entries failed (key={key})"))?;

        Ok(row.map(|(value, stored_at)| CacheHit::new(value, stored_at, now)))
    }

    async fn put(&self, key: &str, value: Value, stored_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "INSERT INTO cache_entries (key, value, stored_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (key) DO UPDATE SET \
               value = EXCLUDED.value, \
               stored_at = EXCLUDED.stored_at",
        )
        .persistent(false)
        .bind(key)
        .bind(value)
        .bind(stored_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upsert cache_entries failed (key={key})"))?;
        Ok(())
    }
}
