use crate::domain::company::{finite, Company, UNKNOWN_SECTOR};
use crate::ingest::types::RawFundamentals;

/// Builds a company record from whatever was fetched for `symbol`.
pub fn build_company(symbol: &str, raw: RawFundamentals) -> Company {
    let RawFundamentals {
        profile,
        price_history,
        latest_income,
        prior_income,
        balance,
        enterprise_value,
    } = raw;

    let profile = profile.unwrap_or_default();
    let latest = latest_income.unwrap_or_default();
    let prior = prior_income.unwrap_or_default();
    let balance = balance.unwrap_or_default();

    let ebitda = latest.ebitda.and_then(finite);
    let revenue = latest.revenue.and_then(finite);
    let net_debt = net_debt(balance.total_debt, balance.cash_and_short_term_investments);
    let enterprise_value = enterprise_value.and_then(finite);

    Company {
        symbol: symbol.to_string(),
        name: profile
            .company_name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| symbol.to_string()),
        sector: profile
            .sector
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
        country: profile.country.filter(|s| !s.trim().is_empty()),
        price: profile.price.and_then(finite),
        trend: trend(&price_history),
        price_history,
        revenue,
        ebitda_margin: ebitda_margin(ebitda, revenue),
        debt_to_ebitda: debt_to_ebitda(net_debt, ebitda),
        growth: percent_change(revenue, prior.revenue),
        ebitda,
        ebitda_growth: percent_change(ebitda, prior.ebitda),
        net_debt,
        shares_outstanding: latest.weighted_average_shs_out.and_then(finite),
        enterprise_value,
        revenue_to_ev: revenue_to_ev(revenue, enterprise_value),
        roe: return_on_equity(latest.net_income, balance.total_stockholders_equity),
    }
}

/// `(latest - prior) / prior * 100`; undefined when either side is missing or
/// the prior value is zero.
pub fn percent_change(latest: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let latest = latest?;
    let prior = prior.filter(|p| *p != 0.0)?;
    finite((latest - prior) / prior * 100.0)
}

pub fn ebitda_margin(ebitda: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    let revenue = revenue.filter(|r| *r != 0.0)?;
    finite(ebitda? / revenue * 100.0)
}

/// Cash defaults to zero; total debt is required.
pub fn net_debt(total_debt: Option<f64>, cash: Option<f64>) -> Option<f64> {
    finite(total_debt? - cash.unwrap_or(0.0))
}

pub fn debt_to_ebitda(net_debt: Option<f64>, ebitda: Option<f64>) -> Option<f64> {
    let ebitda = ebitda.filter(|e| *e > 0.0)?;
    finite(net_debt? / ebitda)
}

pub fn return_on_equity(net_income: Option<f64>, equity: Option<f64>) -> Option<f64> {
    let equity = equity.filter(|e| *e > 0.0)?;
    finite(net_income? / equity * 100.0)
}

pub fn revenue_to_ev(revenue: Option<f64>, enterprise_value: Option<f64>) -> Option<f64> {
    let ev = enterprise_value.filter(|v| *v != 0.0)?;
    finite(revenue? / ev)
}

/// Percent change from the first to the last close.
pub fn trend(history: &[f64]) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }
    let start = *history.first()?;
    let end = *history.last()?;
    if !start.is_finite() || start == 0.0 {
        return None;
    }
    finite((end - start) / start * 100.0)
}
