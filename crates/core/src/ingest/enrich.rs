use crate::domain::company::Company;
use crate::ingest::provider::FundamentalsProvider;
use crate::ingest::ratios::build_company;
use crate::ingest::types::RawFundamentals;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Pause between two symbols, to stay under the provider's rate limit.
    pub delay: Duration,
    /// Log progress every N symbols (0 disables periodic progress logs).
    pub progress_every: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            progress_every: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub symbols: usize,
    pub failed_requests: usize,
    /// Symbols for which every request failed.
    pub empty_records: usize,
}

/// Fetches and enriches one symbol. The five requests run concurrently; a
/// failed request leaves its fields null and never aborts the record.
pub async fn fetch_company(provider: &dyn FundamentalsProvider, symbol: &str) -> (Company, usize) {
    let (profile, history, income, balance, ev) = tokio::join!(
        provider.fetch_profile(symbol),
        provider.fetch_price_history(symbol),
        provider.fetch_income_statements(symbol),
        provider.fetch_balance_sheet(symbol),
        provider.fetch_enterprise_value(symbol),
    );

    let mut failures = 0usize;
    let profile = settle(symbol, "profile", profile, &mut failures).flatten();
    let price_history = settle(symbol, "price_history", history, &mut failures).unwrap_or_default();
    let mut income = settle(symbol, "income_statement", income, &mut failures)
        .unwrap_or_default()
        .into_iter();
    let balance = settle(symbol, "balance_sheet", balance, &mut failures).flatten();
    let enterprise_value = settle(symbol, "enterprise_value", ev, &mut failures).flatten();

    let raw = RawFundamentals {
        profile,
        price_history,
        latest_income: income.next(),
        prior_income: income.next(),
        balance,
        enterprise_value,
    };

    (build_company(symbol, raw), failures)
}

/// Walks `symbols` strictly in order, one symbol at a time, sleeping
/// `opts.delay` between symbols.
pub async fn fetch_companies(
    provider: &dyn FundamentalsProvider,
    symbols: &[String],
    opts: &EnrichOptions,
) -> (Vec<Company>, FetchStats) {
    let total = symbols.len();
    let mut companies = Vec::with_capacity(total);
    let mut stats = FetchStats::default();

    for (idx, symbol) in symbols.iter().enumerate() {
        if idx != 0 && !opts.delay.is_zero() {
            tokio::time::sleep(opts.delay).await;
        }

        tracing::debug!(%symbol, provider = provider.provider_name(), "fetching fundamentals");
        let (company, failures) = fetch_company(provider, symbol).await;

        stats.symbols += 1;
        stats.failed_requests += failures;
        if failures == REQUESTS_PER_SYMBOL {
            stats.empty_records += 1;
        }
        companies.push(company);

        if opts.progress_every != 0 {
            let n = idx + 1;
            if n == 1 || n == total || n % opts.progress_every == 0 {
                tracing::info!(
                    processed = n,
                    total,
                    failed_requests = stats.failed_requests,
                    "fundamentals fetch progress"
                );
            }
        }
    }

    (companies, stats)
}

const REQUESTS_PER_SYMBOL: usize = 5;

fn settle<T>(
    symbol: &str,
    what: &'static str,
    res: anyhow::Result<T>,
    failures: &mut usize,
) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(err) => {
            *failures += 1;
            let err = format!("{err:#}");
            tracing::warn!(%symbol, request = what, error = %err, "request failed; field left empty");
            None
        }
    }
}
