//! Dataset Model
//!
//! One record per PSU per year, matching the column layout of the persisted
//! CSV file.

use serde::{Deserialize, Serialize};

/// A single yearly financial record for one PSU
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PsuRecord {
    #[serde(rename = "PSU_Name")]
    pub psu_name: String,

    #[serde(rename = "Sector")]
    pub sector: String,

    #[serde(rename = "Size")]
    pub size: String,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "Revenue")]
    pub revenue: f64,

    #[serde(rename = "Net_Profit")]
    pub net_profit: f64,

    #[serde(rename = "Profit_Margin")]
    pub profit_margin: f64,

    #[serde(rename = "Debt_Equity")]
    pub debt_equity: f64,

    #[serde(rename = "ROE")]
    pub roe: f64,

    #[serde(rename = "Assets")]
    pub assets: f64,

    #[serde(rename = "Liabilities")]
    pub liabilities: f64,
}

/// Rankable financial metric
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Roe,
    ProfitMargin,
    Revenue,
    NetProfit,
    DebtEquity,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Roe,
        Metric::ProfitMargin,
        Metric::Revenue,
        Metric::NetProfit,
        Metric::DebtEquity,
    ];

    /// Canonical name as it appears in tool parameters and the CSV header
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Roe => "ROE",
            Metric::ProfitMargin => "Profit_Margin",
            Metric::Revenue => "Revenue",
            Metric::NetProfit => "Net_Profit",
            Metric::DebtEquity => "Debt_Equity",
        }
    }

    /// Exact-match parse against the canonical names
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Comma-separated canonical names, for error messages
    pub fn valid_options() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Extract this metric's value from a record
    pub fn value(self, record: &PsuRecord) -> f64 {
        match self {
            Metric::Roe => record.roe,
            Metric::ProfitMargin => record.profit_margin,
            Metric::Revenue => record.revenue,
            Metric::NetProfit => record.net_profit,
            Metric::DebtEquity => record.debt_equity,
        }
    }

    /// Lower is better only for leverage
    pub fn ranks_ascending(self) -> bool {
        matches!(self, Metric::DebtEquity)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
