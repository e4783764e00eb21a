//! Per-trader risk-limit configuration.

use serde::{Deserialize, Serialize};

/// Risk ceilings configured per trader.
///
/// Supplied externally; when a trader has no configured limits the documented
/// defaults are substituted silently, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Maximum percentage of equity risked on a single trade
    pub max_risk_per_trade: f64,

    /// Maximum percentage loss allowed in a single day
    pub daily_loss_limit: f64,

    /// Maximum percentage loss allowed in a single week
    pub weekly_loss_limit: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 2.0,
            daily_loss_limit: 5.0,
            weekly_loss_limit: 10.0,
        }
    }
}
