use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use finscore_core::dashboard::{Dashboard, LoadSource};
use finscore_core::domain::book::ScoredCompany;
use finscore_core::domain::sector::{SectorProfile, DEFAULT_SECTOR_PROFILE, SECTOR_PROFILES};
use finscore_core::scoring::{sub_scores, SubScore};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    let cache = finscore_core::storage::cache::from_settings(&settings).await?;
    let dashboard = Arc::new(Dashboard::from_settings(&settings, cache));

    match dashboard.load(false).await {
        Ok(report) => {
            tracing::info!(companies = report.companies, source = ?report.source, "companies loaded")
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "initial load failed; starting API in degraded mode");
        }
    }

    let app = router(AppState { dashboard });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    dashboard: Arc<Dashboard>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/companies", get(list_companies))
        .route("/companies/:symbol", get(get_company))
        .route("/rankings", get(get_rankings))
        .route("/sectors", get(list_sectors))
        .route("/refresh", post(refresh))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Makes sure the book is loaded and not older than the cache max age.
/// Without any data to serve, the API is unavailable rather than empty.
async fn ready(state: &AppState) -> Result<(), StatusCode> {
    match state.dashboard.ensure_loaded().await {
        Ok(_) => Ok(()),
        Err(e) => {
            if state.dashboard.is_loaded().await {
                // Serve the previous book rather than failing.
                tracing::warn!(error = %e, "reload failed; serving previous data");
                Ok(())
            } else {
                sentry_anyhow::capture_anyhow(&e);
                Err(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}

async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<ScoredCompany>>, StatusCode> {
    ready(&state).await?;
    Ok(Json(state.dashboard.scores().await))
}

#[derive(Debug, Serialize)]
struct ApiCompanyDetail {
    #[serde(flatten)]
    scored: ScoredCompany,
    #[serde(rename = "subScores")]
    sub_scores: Vec<SubScore>,
}

async fn get_company(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiCompanyDetail>, StatusCode> {
    ready(&state).await?;
    let scored = state
        .dashboard
        .company(&symbol)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiCompanyDetail {
        sub_scores: sub_scores(&scored.company),
        scored,
    }))
}

async fn get_rankings(State(state): State<AppState>) -> Result<Json<Vec<ScoredCompany>>, StatusCode> {
    ready(&state).await?;
    Ok(Json(state.dashboard.ranked().await))
}

#[derive(Debug, Serialize)]
struct ApiSectors {
    sectors: &'static [SectorProfile],
    default: &'static SectorProfile,
}

async fn list_sectors() -> Json<ApiSectors> {
    Json(ApiSectors {
        sectors: SECTOR_PROFILES,
        default: &DEFAULT_SECTOR_PROFILE,
    })
}

#[derive(Debug, Serialize)]
struct ApiRefresh {
    companies: usize,
    source: &'static str,
}

async fn refresh(State(state): State<AppState>) -> Result<Json<ApiRefresh>, StatusCode> {
    let report = state.dashboard.load(true).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "forced reload failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(ApiRefresh {
        companies: report.companies,
        source: match report.source {
            LoadSource::Memory => "memory",
            LoadSource::Cache => "cache",
            LoadSource::Artifact => "artifact",
        },
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use finscore_core::domain::company::Company;
    use finscore_core::storage::cache::{CachePolicy, MemoryCacheStore};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn utility(symbol: &str, debt_to_ebitda: Option<f64>) -> Company {
        let mut c = Company::bare(symbol);
        c.sector = "Utilities".to_string();
        c.ebitda_margin = Some(25.0);
        c.debt_to_ebitda = debt_to_ebitda;
        c.trend = Some(0.0);
        c
    }

    async fn app(dir: &tempfile::TempDir, companies: Option<&[Company]>) -> Router {
        let path = dir.path().join("data.json");
        if let Some(companies) = companies {
            finscore_core::storage::artifact::write_companies(&path, companies)
                .await
                .unwrap();
        }
        let dashboard = Dashboard::new(
            Arc::new(MemoryCacheStore::default()),
            CachePolicy {
                key: "cachedCompanyData".to_string(),
                max_age: Duration::from_secs(3600),
            },
            path,
        );
        router(AppState {
            dashboard: Arc::new(dashboard),
        })
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let res = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn lists_companies_with_scores() {
        let dir = tempfile::tempdir().unwrap();
        let companies = [utility("ENGI.PA", Some(2.0)), utility("VIV.PA", None)];
        let app = app(&dir, Some(&companies)).await;

        let (status, body) = call(app, "GET", "/companies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["company"]["symbol"], "ENGI.PA");
        assert_eq!(body[0]["score"]["score"], "62.00");
        assert_eq!(body[1]["score"]["score"], "N/A");
        assert_eq!(body[1]["score"]["missing"][0], "debtToEbitda");
    }

    #[tokio::test]
    async fn unknown_symbol_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let companies = [utility("ENGI.PA", Some(2.0))];
        let app = app(&dir, Some(&companies)).await;

        let (status, _) = call(app.clone(), "GET", "/companies/NOPE.PA").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(app, "GET", "/companies/ENGI.PA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"]["score"], "62.00");
    }

    #[tokio::test]
    async fn company_detail_breaks_down_sub_scores() {
        let dir = tempfile::tempdir().unwrap();
        let companies = [utility("VIV.PA", None)];
        let app = app(&dir, Some(&companies)).await;

        let (status, body) = call(app, "GET", "/companies/viv.pa").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company"]["symbol"], "VIV.PA");
        assert_eq!(body["score"]["score"], "N/A");

        let subs = body["subScores"].as_array().unwrap();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0]["metric"], "ebitdaMargin");
        assert_eq!(subs[0]["weight"], 0.4);
        assert_eq!(subs[0]["score"], 50.0);
        assert_eq!(subs[1]["metric"], "debtToEbitda");
        assert!(subs[1]["score"].is_null());
    }

    #[tokio::test]
    async fn missing_artifact_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, None).await;

        let (status, _) = call(app.clone(), "GET", "/companies").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = call(app, "POST", "/refresh").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn refresh_rereads_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let companies = [utility("ENGI.PA", Some(2.0))];
        let app = app(&dir, Some(&companies)).await;

        let (status, body) = call(app, "POST", "/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["companies"], 1);
        assert_eq!(body["source"], "artifact");
    }

    #[tokio::test]
    async fn sectors_expose_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, None).await;

        let (status, body) = call(app, "GET", "/sectors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default"]["sector"], "default");
        let utilities = body["sectors"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["sector"] == "Utilities")
            .unwrap();
        assert_eq!(utilities["metrics"][1]["metric"], "debtToEbitda");
        assert_eq!(utilities["metrics"][1]["weight"], 0.4);
    }

    #[tokio::test]
    async fn rankings_put_best_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut strong = utility("TTE.PA", Some(0.5));
        strong.ebitda_margin = Some(45.0);
        let companies = [utility("VIV.PA", None), utility("ENGI.PA", Some(2.0)), strong];
        let app = app(&dir, Some(&companies)).await;

        let (status, body) = call(app, "GET", "/rankings").await;
        assert_eq!(status, StatusCode::OK);
        let symbols: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["company"]["symbol"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(symbols, vec!["TTE.PA", "ENGI.PA", "VIV.PA"]);
    }
}
