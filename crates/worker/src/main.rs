use anyhow::Context;
use clap::Parser;
use finscore_core::ingest::enrich::{fetch_companies, EnrichOptions};
use finscore_core::ingest::provider::{FmpClient, FundamentalsProvider};
use finscore_core::storage::cache::CacheStore;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;
mod universe;

#[derive(Debug, Parser)]
#[command(name = "finscore_worker")]
struct Args {
    /// Where to write the company artifact. Defaults to DATA_OUTPUT_PATH.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Comma-separated symbols. Defaults to SYMBOLS, then the built-in CAC 40 list.
    #[arg(long)]
    symbols: Option<String>,

    /// Pause between two symbols, in milliseconds. Defaults to FETCH_DELAY_MS.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Fetch and log, but do not write the artifact or the cache.
    #[arg(long)]
    dry_run: bool,

    /// Also store the fresh records in the configured cache backend.
    #[arg(long)]
    prime_cache: bool,

    /// Print a score table to stdout when done.
    #[arg(long)]
    print_scores: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finscore_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&settings, args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "fetch run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: &finscore_core::config::Settings, args: Args) -> anyhow::Result<()> {
    let symbols = universe::resolve_symbols(args.symbols.as_deref(), settings.symbols.as_deref())?;
    let output = args
        .output
        .unwrap_or_else(|| settings.data_output_path.clone());
    let opts = EnrichOptions {
        delay: args
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(settings.fetch_delay),
        progress_every: settings.progress_every,
    };

    let provider = FmpClient::from_settings(settings)?;
    tracing::info!(
        symbols = symbols.len(),
        delay_ms = opts.delay.as_millis() as u64,
        provider = provider.provider_name(),
        "starting fundamentals fetch"
    );

    let (companies, stats) = fetch_companies(&provider, &symbols, &opts).await;

    tracing::info!(
        symbols = stats.symbols,
        failed_requests = stats.failed_requests,
        empty_records = stats.empty_records,
        "fundamentals fetch finished"
    );

    if args.print_scores {
        print!("{}", report::score_table(&companies));
    }

    if args.dry_run {
        tracing::info!(dry_run = true, companies = companies.len(), path = %output.display(), "skipping artifact write");
        return Ok(());
    }

    finscore_core::storage::artifact::write_companies(&output, &companies).await?;
    tracing::info!(companies = companies.len(), path = %output.display(), "artifact saved");

    if args.prime_cache {
        let cache = finscore_core::storage::cache::from_settings(settings).await?;
        let value = serde_json::to_value(&companies).context("serialize companies failed")?;
        cache
            .put(&settings.cache_key, value, chrono::Utc::now())
            .await?;
        tracing::info!(backend = cache.backend_name(), key = %settings.cache_key, "cache primed");
    }

    Ok(())
}

fn init_sentry(settings: &finscore_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
