//! KPI score result: the engine's sole output record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Governance verdict derived from the composite score and drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    Promote,
    Maintain,
    Retrain,
    Suspend,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::Promote => "promote",
            RecommendedAction::Maintain => "maintain",
            RecommendedAction::Retrain => "retrain",
            RecommendedAction::Suspend => "suspend",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendedAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "promote" => Ok(RecommendedAction::Promote),
            "maintain" => Ok(RecommendedAction::Maintain),
            "retrain" => Ok(RecommendedAction::Retrain),
            "suspend" => Ok(RecommendedAction::Suspend),
            other => Err(anyhow::anyhow!("unknown recommended action: {other}")),
        }
    }
}

/// Composite KPI evaluation for one trader over one scoring period.
///
/// Immutable once produced; a later computation for the same
/// (trader, period) pair fully supersedes the prior one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiScoreResult {
    /// Trader this evaluation belongs to
    pub trader_id: String,

    /// First day of the scoring period (inclusive)
    pub period_start: NaiveDate,

    /// Last day of the scoring period (inclusive)
    pub period_end: NaiveDate,

    // === Sub-scores (0-100 each) ===
    /// Risk discipline sub-score (weight 0.40)
    pub risk_discipline_score: f64,

    /// Consistency sub-score (weight 0.25)
    pub consistency_score: f64,

    /// Strategy execution sub-score (weight 0.20)
    pub strategy_execution_score: f64,

    /// Profitability sub-score (weight 0.15)
    pub profitability_score: f64,

    /// Weighted composite of the four sub-scores (0-100)
    pub total_score: f64,

    // === Supporting statistics ===
    /// Number of trades in the period
    pub total_trades: u32,

    /// Trades with strictly positive realized P&L
    pub winning_trades: u32,

    /// Win rate as a percentage of all trades
    pub win_rate: f64,

    /// Mean R-multiple over closed trades with a recorded R
    pub avg_r_multiple: f64,

    /// Largest peak-to-trough decline of the cumulative P&L curve, in percent
    pub max_drawdown: f64,

    /// Expected R-multiple per trade given historical win rate and win/loss size
    pub expectancy: f64,

    /// Governance verdict
    pub recommended_action: RecommendedAction,

    /// When this evaluation was computed
    pub calculated_at: DateTime<Utc>,
}
