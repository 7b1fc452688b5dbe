use crate::domain::company::Company;
use crate::scoring::{score_company, ScoreOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// The set of companies currently on display.
///
/// Replaced wholesale on every load; individual records are never mutated in
/// place.
#[derive(Debug, Clone, Default)]
pub struct CompanyBook {
    companies: Vec<Company>,
    loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCompany {
    pub company: Company,
    pub score: ScoreOutcome,
}

impl CompanyBook {
    pub fn new(companies: Vec<Company>, loaded_at: DateTime<Utc>) -> Self {
        Self {
            companies,
            loaded_at: Some(loaded_at),
        }
    }

    pub fn replace_all(&mut self, companies: Vec<Company>, loaded_at: DateTime<Utc>) {
        self.companies = companies;
        self.loaded_at = Some(loaded_at);
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Company> {
        self.companies
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn scored(&self) -> Vec<ScoredCompany> {
        self.companies
            .iter()
            .map(|c| ScoredCompany {
                score: score_company(c),
                company: c.clone(),
            })
            .collect()
    }

    /// Scored companies, best first. Unavailable scores sort last; ties break
    /// on symbol.
    pub fn ranked(&self) -> Vec<ScoredCompany> {
        let mut out = self.scored();
        out.sort_by(|a, b| {
            let by_score = match (a.score.score(), b.score.score()) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_score.then_with(|| a.company.symbol.cmp(&b.company.symbol))
        });
        out
    }
}
