use crate::domain::company::Company;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Writes the companies as a pretty-printed JSON array.
///
/// The document is written to a sibling temp file first and renamed into
/// place, so readers never observe a half-written artifact.
pub async fn write_companies(path: &Path, companies: &[Company]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let body = serde_json::to_vec_pretty(companies).context("serialize companies failed")?;

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, &body)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move {} into place", path.display()))?;

    tracing::debug!(path = %path.display(), companies = companies.len(), bytes = body.len(), "wrote company artifact");
    Ok(())
}

pub async fn read_companies(path: &Path) -> anyhow::Result<Vec<Company>> {
    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice::<Vec<Company>>(&body)
        .with_context(|| format!("{} is not a valid company artifact", path.display()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "data.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Company> {
        let mut a = Company::bare("OR.PA");
        a.name = "L'Oréal".to_string();
        a.sector = "Consumer Defensive".to_string();
        a.price = Some(402.5);
        a.price_history = vec![380.0, 391.25, 402.5];
        a.revenue = Some(43_480_000_000.0);
        a.ebitda_margin = Some(24.3);
        a.trend = Some(5.92);

        let b = Company::bare("ATO.PA");
        vec![a, b]
    }

    #[tokio::test]
    async fn round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("data").join("data.json");

        let companies = sample();
        write_companies(&path, &companies).await.unwrap();
        let back = read_companies(&path).await.unwrap();

        assert_eq!(back, companies);
        assert!(!tmp_path(&path).exists());
    }

    fn finite() -> impl Strategy<Value = f64> {
        prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
    }

    proptest! {
        #[test]
        fn round_trips_arbitrary_finite_figures(
            price in prop::option::of(finite()),
            history in prop::collection::vec(finite(), 0..8),
            revenue in prop::option::of(-1e12f64..1e12),
            margin in prop::option::of(finite()),
            net_debt in prop::option::of(finite()),
            revenue_to_ev in prop::option::of(finite()),
            trend in prop::option::of(finite()),
        ) {
            let mut c = Company::bare("MC.PA");
            c.price = price;
            c.price_history = history;
            c.revenue = revenue;
            c.ebitda_margin = margin;
            c.net_debt = net_debt;
            c.revenue_to_ev = revenue_to_ev;
            c.trend = trend;
            let companies = vec![c];

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("data.json");
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let back = rt.block_on(async {
                write_companies(&path, &companies).await.unwrap();
                read_companies(&path).await.unwrap()
            });

            prop_assert_eq!(back, companies);
        }
    }

    #[test]
    fn round_trips_shortest_repr_edge_value() {
        let mut c = Company::bare("MC.PA");
        c.revenue = Some(-957702710793.9359);
        let body = serde_json::to_vec_pretty(&[c.clone()]).unwrap();
        let back: Vec<Company> = serde_json::from_slice(&body).unwrap();
        assert_eq!(back, vec![c]);
    }

    #[tokio::test]
    async fn writes_nulls_explicitly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        write_companies(&path, &sample()).await.unwrap();

        let v: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(v[1]["roe"].is_null());
        assert_eq!(v[0]["priceHistory"][2], 402.5);
    }

    #[tokio::test]
    async fn rejects_malformed_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, b"{\"not\": \"an array\"}").unwrap();

        assert!(read_companies(&path).await.is_err());
    }

    #[tokio::test]
    async fn missing_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_companies(&dir.path().join("nope.json")).await.is_err());
    }
}
