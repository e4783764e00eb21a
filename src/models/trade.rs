//! Trade model representing a single logged trade attempt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Long => "long",
            TradeDirection::Short => "short",
        }
    }
}

/// Lifecycle status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
            TradeStatus::Cancelled => "cancelled",
        }
    }
}

/// One logged trade attempt for a trader.
///
/// Constructed once at the storage boundary; the scoring pipeline only ever
/// reads these. Streak and drawdown consumers require trades in chronological
/// order, which the storage layer guarantees by sorting on `executed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Unique trade identifier; import assigns one when absent
    #[serde(default)]
    pub id: String,

    /// Owning trader
    pub trader_id: String,

    /// Profit/loss as a percentage of account equity (None while open)
    pub pnl_percentage: Option<f64>,

    /// Profit/loss in account currency (None while open)
    pub pnl_amount: Option<Decimal>,

    /// Risk-adjusted return multiple; only meaningful once closed
    pub r_multiple: Option<f64>,

    /// Percentage of equity risked on entry (always >= 0)
    pub risk_percentage: f64,

    /// Whether the trader reported following their trading rules
    pub rules_followed: Option<bool>,

    /// Rule-violation tags logged against this trade
    #[serde(default)]
    pub rule_violations: Vec<String>,

    /// Strategy this trade was taken under, if tagged
    pub strategy_id: Option<String>,

    /// Stop-loss price; zero means no stop was set
    #[serde(default)]
    pub stop_loss: Decimal,

    /// Entry price
    pub entry_price: Decimal,

    /// Exit price; None until the trade is closed
    pub exit_price: Option<Decimal>,

    /// Trade direction
    pub direction: TradeDirection,

    /// Lifecycle status
    pub status: TradeStatus,

    /// When the trade was executed
    pub executed_at: DateTime<Utc>,
}

impl TradeRecord {
    /// A winning trade has a strictly positive realized P&L.
    /// Trades with no recorded P&L count as non-winning.
    pub fn is_winning(&self) -> bool {
        self.pnl_amount.map(|p| p > Decimal::ZERO).unwrap_or(false)
    }

    /// Whether a stop-loss was set on this trade.
    pub fn has_stop_loss(&self) -> bool {
        self.stop_loss > Decimal::ZERO
    }

    /// R-multiple for closed trades; None for open/cancelled trades or
    /// closed trades without a recorded R.
    pub fn closed_r(&self) -> Option<f64> {
        match self.status {
            TradeStatus::Closed => self.r_multiple,
            _ => None,
        }
    }
}
