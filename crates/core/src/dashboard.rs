use crate::config::Settings;
use crate::domain::book::{CompanyBook, ScoredCompany};
use crate::domain::company::Company;
use crate::storage::artifact;
use crate::storage::cache::{CachePolicy, CacheStore};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The book was already fresh; nothing was read.
    Memory,
    Cache,
    Artifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub source: LoadSource,
    pub companies: usize,
}

/// Owns the company book shown to users, along with where it comes from:
/// the cache store first, the JSON artifact when the cache is stale.
pub struct Dashboard {
    book: tokio::sync::RwLock<CompanyBook>,
    cache: Arc<dyn CacheStore>,
    policy: CachePolicy,
    artifact_path: PathBuf,
}

impl Dashboard {
    pub fn new(cache: Arc<dyn CacheStore>, policy: CachePolicy, artifact_path: PathBuf) -> Self {
        Self {
            book: tokio::sync::RwLock::new(CompanyBook::default()),
            cache,
            policy,
            artifact_path,
        }
    }

    pub fn from_settings(settings: &Settings, cache: Arc<dyn CacheStore>) -> Self {
        Self::new(
            cache,
            CachePolicy::from_settings(settings),
            settings.data_output_path.clone(),
        )
    }

    pub async fn load(&self, force: bool) -> anyhow::Result<LoadReport> {
        self.load_at(force, Utc::now()).await
    }

    /// Installs fresh cached data if there is any (unless `force`), otherwise
    /// reads the artifact and writes it through to the cache.
    pub async fn load_at(&self, force: bool, now: DateTime<Utc>) -> anyhow::Result<LoadReport> {
        if !force {
            if let Some((companies, stored_at)) = self.fresh_from_cache(now).await? {
                let n = companies.len();
                // The book ages from when the entry was stored, not from this read.
                self.book.write().await.replace_all(companies, stored_at);
                tracing::info!(companies = n, backend = self.cache.backend_name(), "loaded companies from cache");
                return Ok(LoadReport {
                    source: LoadSource::Cache,
                    companies: n,
                });
            }
        }

        let companies = artifact::read_companies(&self.artifact_path).await?;
        let n = companies.len();

        let value = serde_json::to_value(&companies).context("serialize companies failed")?;
        if let Err(err) = self.cache.put(&self.policy.key, value, now).await {
            // Serving stays possible without the cache.
            tracing::warn!(error = %err, key = %self.policy.key, "failed to write companies to cache");
        }

        {
            let mut book = self.book.write().await;
            book.replace_all(companies, now);
            if book.is_empty() {
                tracing::warn!(path = %self.artifact_path.display(), "artifact holds no companies");
            }
        }
        tracing::info!(
            companies = n,
            force,
            path = %self.artifact_path.display(),
            "loaded companies from artifact"
        );
        Ok(LoadReport {
            source: LoadSource::Artifact,
            companies: n,
        })
    }

    /// Loads on first use and whenever the book has outlived the cache max age.
    pub async fn ensure_loaded(&self) -> anyhow::Result<LoadReport> {
        self.ensure_loaded_at(Utc::now()).await
    }

    pub async fn ensure_loaded_at(&self, now: DateTime<Utc>) -> anyhow::Result<LoadReport> {
        {
            let book = self.book.read().await;
            if let Some(at) = book.loaded_at() {
                let age = (now - at).to_std().unwrap_or_default();
                if age < self.policy.max_age {
                    return Ok(LoadReport {
                        source: LoadSource::Memory,
                        companies: book.len(),
                    });
                }
            }
        }
        self.load_at(false, now).await
    }

    async fn fresh_from_cache(
        &self,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<(Vec<Company>, DateTime<Utc>)>> {
        let hit = match self.cache.get_at(&self.policy.key, now).await {
            Ok(Some(hit)) => hit,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!(error = %err, key = %self.policy.key, "cache read failed; falling back to artifact");
                return Ok(None);
            }
        };

        if !self.policy.is_fresh(&hit) {
            tracing::debug!(age_secs = hit.age.as_secs(), "cached companies expired");
            return Ok(None);
        }

        match serde_json::from_value::<Vec<Company>>(hit.value) {
            Ok(companies) => Ok(Some((companies, hit.stored_at))),
            Err(err) => {
                tracing::warn!(error = %err, key = %self.policy.key, "cached companies undecodable; ignoring");
                Ok(None)
            }
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.book.read().await.is_loaded()
    }

    pub async fn companies(&self) -> Vec<Company> {
        self.book.read().await.companies().to_vec()
    }

    pub async fn company(&self, symbol: &str) -> Option<ScoredCompany> {
        let book = self.book.read().await;
        let company = book.get(symbol)?.clone();
        Some(ScoredCompany {
            score: crate::scoring::score_company(&company),
            company,
        })
    }

    pub async fn scores(&self) -> Vec<ScoredCompany> {
        self.book.read().await.scored()
    }

    pub async fn ranked(&self) -> Vec<ScoredCompany> {
        self.book.read().await.ranked()
    }
}
