use serde::{Deserialize, Serialize};

pub const UNKNOWN_SECTOR: &str = "Unknown";

/// One company as persisted in the JSON artifact.
///
/// Every derived field is nullable: `None` means the upstream data was missing
/// or the ratio is undefined for this company, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_history: Vec<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub ebitda_margin: Option<f64>,
    #[serde(default)]
    pub debt_to_ebitda: Option<f64>,
    #[serde(default)]
    pub growth: Option<f64>,
    #[serde(default)]
    pub ebitda: Option<f64>,
    #[serde(default)]
    pub ebitda_growth: Option<f64>,
    #[serde(default)]
    pub net_debt: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub enterprise_value: Option<f64>,
    #[serde(default, rename = "revenueToEV")]
    pub revenue_to_ev: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub trend: Option<f64>,
}

impl Company {
    /// A record with identity only; every financial field is missing.
    pub fn bare(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            sector: UNKNOWN_SECTOR.to_string(),
            country: None,
            price: None,
            price_history: Vec::new(),
            revenue: None,
            ebitda_margin: None,
            debt_to_ebitda: None,
            growth: None,
            ebitda: None,
            ebitda_growth: None,
            net_debt: None,
            shares_outstanding: None,
            enterprise_value: None,
            revenue_to_ev: None,
            roe: None,
            trend: None,
        }
    }

    /// EV / EBITDA from market cap plus net debt.
    ///
    /// Undefined when price, shares outstanding or EBITDA is missing or zero.
    /// Missing net debt counts as zero.
    pub fn ev_to_ebitda(&self) -> Option<f64> {
        let price = self.price.filter(|v| *v != 0.0)?;
        let shares = self.shares_outstanding.filter(|v| *v != 0.0)?;
        let ebitda = self.ebitda.filter(|v| *v != 0.0)?;
        let ev = price * shares + self.net_debt.unwrap_or(0.0);
        finite(ev / ebitda)
    }
}

/// Collapses NaN and infinities into "undefined".
pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
