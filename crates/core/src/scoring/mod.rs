pub mod normalize;

use crate::domain::company::Company;
use crate::domain::sector::{profile_for, Metric, SectorProfile};
use crate::format::NOT_AVAILABLE;
use serde::{Serialize, Serializer};
use std::fmt;

/// Composite score, kept at two-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    fn from_raw(raw: f64) -> Self {
        Self((raw * 100.0).round() / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Available(Score),
    /// At least one metric required by the sector profile is missing.
    Unavailable { missing: Vec<Metric> },
}

impl ScoreOutcome {
    pub fn score(&self) -> Option<Score> {
        match self {
            ScoreOutcome::Available(s) => Some(*s),
            ScoreOutcome::Unavailable { .. } => None,
        }
    }

    pub fn missing(&self) -> &[Metric] {
        match self {
            ScoreOutcome::Available(_) => &[],
            ScoreOutcome::Unavailable { missing } => missing,
        }
    }
}

impl fmt::Display for ScoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreOutcome::Available(s) => fmt::Display::fmt(s, f),
            ScoreOutcome::Unavailable { .. } => f.write_str(NOT_AVAILABLE),
        }
    }
}

// Wire shape: {"score": "62.00" | "N/A", "missing": [...]}.
impl Serialize for ScoreOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            score: String,
            missing: &'a [Metric],
        }

        Wire {
            score: self.to_string(),
            missing: self.missing(),
        }
        .serialize(serializer)
    }
}

/// Scores `company` with the profile of its own sector.
pub fn score_company(company: &Company) -> ScoreOutcome {
    score_with_profile(company, profile_for(&company.sector))
}

pub fn score_with_profile(company: &Company, profile: &SectorProfile) -> ScoreOutcome {
    let missing: Vec<Metric> = profile
        .metrics
        .iter()
        .map(|m| m.metric)
        .filter(|m| m.value(company).is_none())
        .collect();

    if !missing.is_empty() {
        tracing::debug!(
            symbol = %company.symbol,
            name = %company.name,
            sector = %company.sector,
            profile = profile.sector,
            ?missing,
            "company is missing metrics required by its sector profile"
        );
        return ScoreOutcome::Unavailable { missing };
    }

    let raw: f64 = profile
        .metrics
        .iter()
        .map(|m| normalize::scale_for(m.metric).apply(m.metric.value(company)) * m.weight)
        .sum();

    ScoreOutcome::Available(Score::from_raw(raw))
}

/// One profile metric with its weight and its 0..=100 sub-score before
/// weighting. `score` is `None` when the metric is missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScore {
    pub metric: Metric,
    pub weight: f64,
    pub score: Option<f64>,
}

pub fn sub_scores(company: &Company) -> Vec<SubScore> {
    profile_for(&company.sector)
        .metrics
        .iter()
        .map(|m| {
            let v = m.metric.value(company);
            SubScore {
                metric: m.metric,
                weight: m.weight,
                score: v.map(|_| normalize::scale_for(m.metric).apply(v)),
            }
        })
        .collect()
}
