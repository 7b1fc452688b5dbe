use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoricalPriceResponse {
    #[serde(default)]
    pub historical: Vec<HistoricalClose>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalClose {
    #[serde(default)]
    pub close: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub ebitda: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub weighted_average_shs_out: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub cash_and_short_term_investments: Option<f64>,
    #[serde(default)]
    pub total_stockholders_equity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseValueRow {
    #[serde(default)]
    pub enterprise_value: Option<f64>,
}

/// Everything fetched for one symbol. Each part is independently optional:
/// a failed request leaves its part empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFundamentals {
    pub profile: Option<Profile>,
    /// Closing prices, oldest first.
    pub price_history: Vec<f64>,
    pub latest_income: Option<IncomeStatement>,
    pub prior_income: Option<IncomeStatement>,
    pub balance: Option<BalanceSheet>,
    pub enterprise_value: Option<f64>,
}
