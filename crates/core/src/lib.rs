pub mod dashboard;
pub mod domain;
pub mod format;
pub mod ingest;
pub mod scoring;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
    pub const DEFAULT_OUTPUT_PATH: &str = "public/data/data.json";
    pub const DEFAULT_CACHE_KEY: &str = "cachedCompanyData";
    pub const DEFAULT_CACHE_DIR: &str = ".cache";

    const DEFAULT_FMP_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_FETCH_DELAY_MS: u64 = 1500;
    const DEFAULT_PROGRESS_EVERY: usize = 10;
    // 6 hours.
    const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 6 * 60 * 60;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CacheBackend {
        Memory,
        File,
        Postgres,
    }

    impl CacheBackend {
        fn parse(v: Option<String>) -> anyhow::Result<Self> {
            let Some(v) = v.filter(|s| !s.trim().is_empty()) else {
                return Ok(Self::Memory);
            };
            match v.trim().to_ascii_lowercase().as_str() {
                "memory" => Ok(Self::Memory),
                "file" => Ok(Self::File),
                "postgres" | "pg" => Ok(Self::Postgres),
                other => anyhow::bail!("unknown CACHE_BACKEND: {other}"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub fmp_api_key: Option<String>,
        pub fmp_base_url: String,
        pub fmp_timeout: Duration,
        pub fetch_delay: Duration,
        pub progress_every: usize,
        pub data_output_path: PathBuf,
        pub cache_backend: CacheBackend,
        pub cache_dir: PathBuf,
        pub cache_key: String,
        pub cache_max_age: Duration,
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub symbols: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                fmp_api_key: env_nonempty("FMP_API_KEY"),
                fmp_base_url: env_nonempty("FMP_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FMP_BASE_URL.to_string()),
                fmp_timeout: Duration::from_secs(
                    env_parse("FMP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_FMP_TIMEOUT_SECS),
                ),
                fetch_delay: Duration::from_millis(
                    env_parse("FETCH_DELAY_MS")?.unwrap_or(DEFAULT_FETCH_DELAY_MS),
                ),
                progress_every: env_parse("FETCH_PROGRESS_EVERY")?
                    .unwrap_or(DEFAULT_PROGRESS_EVERY),
                data_output_path: env_nonempty("DATA_OUTPUT_PATH")
                    .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string())
                    .into(),
                cache_backend: CacheBackend::parse(std::env::var("CACHE_BACKEND").ok())?,
                cache_dir: env_nonempty("CACHE_DIR")
                    .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string())
                    .into(),
                cache_key: env_nonempty("CACHE_KEY")
                    .unwrap_or_else(|| DEFAULT_CACHE_KEY.to_string()),
                cache_max_age: Duration::from_secs(
                    env_parse("CACHE_MAX_AGE_SECS")?.unwrap_or(DEFAULT_CACHE_MAX_AGE_SECS),
                ),
                database_url: env_nonempty("DATABASE_URL"),
                sentry_dsn: env_nonempty("SENTRY_DSN"),
                symbols: env_nonempty("SYMBOLS"),
            })
        }

        pub fn require_fmp_api_key(&self) -> anyhow::Result<&str> {
            self.fmp_api_key
                .as_deref()
                .context("FMP_API_KEY is required")
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    fn env_nonempty(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env_nonempty(key) {
            Some(s) => s
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("invalid {key}={s}: {e}")),
            None => Ok(None),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn cache_backend_defaults_to_memory() {
            assert_eq!(CacheBackend::parse(None).unwrap(), CacheBackend::Memory);
            assert_eq!(
                CacheBackend::parse(Some("  ".to_string())).unwrap(),
                CacheBackend::Memory
            );
        }

        #[test]
        fn cache_backend_accepts_known_names() {
            assert_eq!(
                CacheBackend::parse(Some("File".to_string())).unwrap(),
                CacheBackend::File
            );
            assert_eq!(
                CacheBackend::parse(Some("pg".to_string())).unwrap(),
                CacheBackend::Postgres
            );
            assert!(CacheBackend::parse(Some("redis".to_string())).is_err());
        }
    }
}
