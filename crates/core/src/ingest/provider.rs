use crate::config::Settings;
use crate::ingest::types::{
    BalanceSheet, EnterpriseValueRow, HistoricalPriceResponse, IncomeStatement, Profile,
};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

// One trading year of daily closes.
const PRICE_HISTORY_POINTS: &str = "252";

/// Source of the raw fundamentals for a single symbol, one call per endpoint.
#[async_trait::async_trait]
pub trait FundamentalsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_profile(&self, symbol: &str) -> Result<Option<Profile>>;

    /// Closing prices, oldest first.
    async fn fetch_price_history(&self, symbol: &str) -> Result<Vec<f64>>;

    /// Most recent statements first (latest, then prior period).
    async fn fetch_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>>;

    async fn fetch_balance_sheet(&self, symbol: &str) -> Result<Option<BalanceSheet>>;

    async fn fetch_enterprise_value(&self, symbol: &str) -> Result<Option<f64>>;
}

/// Financial Modeling Prep v3 REST client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_fmp_api_key()?.to_string();
        Self::new(&settings.fmp_base_url, api_key, settings.fmp_timeout)
    }

    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build FMP http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, endpoint: &str, symbol: &str) -> String {
        format!("{}/{}/{}", self.base_url, endpoint, symbol)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(endpoint, symbol);

        let res = self
            .http
            .get(url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("FMP {endpoint} request failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read FMP {endpoint} response"))?;

        if !status.is_success() {
            anyhow::bail!("FMP {endpoint} HTTP {status}: {}", truncate(&text, 200));
        }

        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("FMP {endpoint} response is not valid JSON"))?;

        // FMP reports key/plan errors with a 200 and an object body.
        if let Some(msg) = raw_json.get("Error Message").and_then(Value::as_str) {
            anyhow::bail!("FMP {endpoint} error: {msg}");
        }

        serde_json::from_value::<T>(raw_json)
            .with_context(|| format!("failed to parse FMP {endpoint} response"))
    }
}

#[async_trait::async_trait]
impl FundamentalsProvider for FmpClient {
    fn provider_name(&self) -> &'static str {
        "financialmodelingprep"
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self.get_json("profile", symbol, &[]).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<Vec<f64>> {
        let body: HistoricalPriceResponse = self
            .get_json(
                "historical-price-full",
                symbol,
                &[("serietype", "line"), ("timeseries", PRICE_HISTORY_POINTS)],
            )
            .await?;

        // FMP returns newest first.
        // Points without a close are skipped rather than failing the series.
        let mut closes: Vec<f64> = body.historical.into_iter().filter_map(|p| p.close).collect();
        closes.reverse();
        Ok(closes)
    }

    async fn fetch_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>> {
        self.get_json("income-statement", symbol, &[("limit", "2")])
            .await
    }

    async fn fetch_balance_sheet(&self, symbol: &str) -> Result<Option<BalanceSheet>> {
        let rows: Vec<BalanceSheet> = self
            .get_json("balance-sheet-statement", symbol, &[("limit", "1")])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_enterprise_value(&self, symbol: &str) -> Result<Option<f64>> {
        let rows: Vec<EnterpriseValueRow> = self
            .get_json("enterprise-values", symbol, &[("limit", "1")])
            .await?;
        Ok(rows.into_iter().next().and_then(|r| r.enterprise_value))
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
