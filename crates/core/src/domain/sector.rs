use crate::domain::company::Company;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    EbitdaMargin,
    DebtToEbitda,
    Growth,
    Revenue,
    Roe,
    Trend,
    EvToEbitda,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::EbitdaMargin => "ebitdaMargin",
            Metric::DebtToEbitda => "debtToEbitda",
            Metric::Growth => "growth",
            Metric::Revenue => "revenue",
            Metric::Roe => "roe",
            Metric::Trend => "trend",
            Metric::EvToEbitda => "evToEbitda",
        }
    }

    /// Raw value of this metric for a company, `None` when missing or non-finite.
    pub fn value(self, c: &Company) -> Option<f64> {
        let v = match self {
            Metric::EbitdaMargin => c.ebitda_margin,
            Metric::DebtToEbitda => c.debt_to_ebitda,
            Metric::Growth => c.growth,
            Metric::Revenue => c.revenue,
            Metric::Roe => c.roe,
            Metric::Trend => c.trend,
            Metric::EvToEbitda => c.ev_to_ebitda(),
        };
        v.filter(|v| v.is_finite())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedMetric {
    pub metric: Metric,
    pub weight: f64,
}

/// Metrics and weights for one sector. Weights are used as declared; they are
/// not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorProfile {
    pub sector: &'static str,
    pub metrics: &'static [WeightedMetric],
}

const fn w(metric: Metric, weight: f64) -> WeightedMetric {
    WeightedMetric { metric, weight }
}

use Metric::*;

pub static SECTOR_PROFILES: &[SectorProfile] = &[
    SectorProfile {
        sector: "Technology",
        metrics: &[
            w(EbitdaMargin, 0.25),
            w(DebtToEbitda, 0.2),
            w(Growth, 0.15),
            w(Revenue, 0.15),
            w(EvToEbitda, 0.15),
            w(Trend, 0.1),
        ],
    },
    SectorProfile {
        sector: "Financial Services",
        metrics: &[w(Roe, 0.5), w(Revenue, 0.3), w(Trend, 0.2)],
    },
    SectorProfile {
        sector: "Healthcare",
        metrics: &[
            w(Growth, 0.3),
            w(EbitdaMargin, 0.25),
            w(Revenue, 0.25),
            w(Trend, 0.2),
        ],
    },
    SectorProfile {
        sector: "Utilities",
        metrics: &[w(EbitdaMargin, 0.4), w(DebtToEbitda, 0.4), w(Trend, 0.2)],
    },
    SectorProfile {
        sector: "Consumer Cyclical",
        metrics: &[
            w(Growth, 0.3),
            w(Revenue, 0.3),
            w(EbitdaMargin, 0.2),
            w(Trend, 0.2),
        ],
    },
    SectorProfile {
        sector: "Consumer Defensive",
        metrics: &[w(Revenue, 0.4), w(EbitdaMargin, 0.4), w(Trend, 0.2)],
    },
    SectorProfile {
        sector: "Communication Services",
        metrics: &[w(EbitdaMargin, 0.4), w(Growth, 0.4), w(Trend, 0.2)],
    },
    SectorProfile {
        sector: "Industrials",
        metrics: &[
            w(EbitdaMargin, 0.3),
            w(DebtToEbitda, 0.3),
            w(Growth, 0.2),
            w(Trend, 0.2),
        ],
    },
    SectorProfile {
        sector: "Basic Materials",
        metrics: &[
            w(EbitdaMargin, 0.3),
            w(DebtToEbitda, 0.3),
            w(Revenue, 0.2),
            w(Trend, 0.2),
        ],
    },
];

pub static DEFAULT_SECTOR_PROFILE: SectorProfile = SectorProfile {
    sector: DEFAULT_PROFILE,
    metrics: &[
        w(EbitdaMargin, 0.25),
        w(DebtToEbitda, 0.25),
        w(Growth, 0.2),
        w(Revenue, 0.2),
        w(Trend, 0.1),
    ],
};

/// Profile for `sector`, falling back to the default profile for unknown
/// or empty sector names.
pub fn profile_for(sector: &str) -> &'static SectorProfile {
    SECTOR_PROFILES
        .iter()
        .find(|p| p.sector == sector)
        .unwrap_or(&DEFAULT_SECTOR_PROFILE)
}
