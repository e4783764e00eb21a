//! Data models for trades, risk limits, and KPI score results.

mod limits;
mod score;
mod trade;

pub use limits::RiskLimits;
pub use score::{KpiScoreResult, RecommendedAction};
pub use trade::{TradeDirection, TradeRecord, TradeStatus};
