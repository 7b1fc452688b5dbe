use crate::config::{CacheBackend, Settings};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub value: Value,
    pub stored_at: DateTime<Utc>,
    /// Wall-clock age at read time. Zero if the entry is from the future.
    pub age: Duration,
}

impl CacheHit {
    pub(crate) fn new(value: Value, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age = (now - stored_at).to_std().unwrap_or(Duration::ZERO);
        Self {
            value,
            stored_at,
            age,
        }
    }
}

/// Key-value store holding JSON payloads with the time they were stored.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheHit>>;

    async fn put(&self, key: &str, value: Value, stored_at: DateTime<Utc>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<CacheHit>> {
        self.get_at(key, Utc::now()).await
    }
}

#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub key: String,
    pub max_age: Duration,
}

impl CachePolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            key: settings.cache_key.clone(),
            max_age: settings.cache_max_age,
        }
    }

    pub fn is_fresh(&self, hit: &CacheHit) -> bool {
        hit.age < self.max_age
    }
}

pub async fn from_settings(settings: &Settings) -> Result<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match settings.cache_backend {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::default()),
        CacheBackend::File => Arc::new(FileCacheStore::new(settings.cache_dir.clone())),
        CacheBackend::Postgres => {
            let db_url = settings.require_database_url()?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .context("connect DATABASE_URL failed")?;
            crate::storage::migrate(&pool).await?;
            Arc::new(crate::storage::pg::PgCacheStore::new(pool))
        }
    };
    tracing::info!(backend = store.backend_name(), "cache store ready");
    Ok(store)
}

#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: tokio::sync::RwLock<HashMap<String, (Value, DateTime<Utc>)>>,
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheHit>> {
        let guard = self.entries.read().await;
        Ok(guard
            .get(key)
            .map(|(value, stored_at)| CacheHit::new(value.clone(), *stored_at, now)))
    }

    async fn put(&self, key: &str, value: Value, stored_at: DateTime<Utc>) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, stored_at));
        Ok(())
    }
}

/// One JSON document per key: `{"timestamp": <unix ms>, "data": <value>}`.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    timestamp: i64,
    data: Value,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

#[async_trait::async_trait]
impl CacheStore for FileCacheStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheHit>> {
        let path = self.path_for(key);
        let body = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        let entry = match serde_json::from_slice::<FileEntry>(&body) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%key, path = %path.display(), error = %err, "corrupt cache entry; ignoring");
                return Ok(None);
            }
        };

        let Some(stored_at) = Utc.timestamp_millis_opt(entry.timestamp).single() else {
            tracing::warn!(%key, timestamp = entry.timestamp, "cache entry has invalid timestamp; ignoring");
            return Ok(None);
        };

        Ok(Some(CacheHit::new(entry.data, stored_at, now)))
    }

    async fn put(&self, key: &str, value: Value, stored_at: DateTime<Utc>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec(&FileEntry {
            timestamp: stored_at.timestamp_millis(),
            data: value,
        })
        .context("serialize cache entry failed")?;

        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to move {} into place", path.display()))?;
        Ok(())
    }
}
