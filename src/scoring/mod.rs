//! Pure scoring pipeline: trades + risk limits in, KPI score result out.
//!
//! Everything in this module is synchronous and side-effect free; the
//! storage layer feeds it chronologically ordered trades and persists
//! whatever comes out.

mod analyzers;
mod metrics;
mod policy;
mod scores;

pub use analyzers::{expectancy, max_drawdown, ExpectancyStats};
pub use metrics::{
    average_risk_ratio, position_size_variance, rules_followed_rate, stop_loss_adherence,
    streaks, violation_count, StreakLengths,
};
pub use policy::{recommend, SUSPEND_DRAWDOWN_PCT};
pub use scores::{
    consistency_score, profitability_score, risk_discipline_score, strategy_execution_score,
    total_score, WEIGHT_CONSISTENCY, WEIGHT_PROFITABILITY, WEIGHT_RISK_DISCIPLINE,
    WEIGHT_STRATEGY_EXECUTION,
};

use chrono::{NaiveDate, Utc};

use crate::models::{KpiScoreResult, RiskLimits, TradeRecord};

/// Run the full scoring pipeline for one trader over one period.
///
/// Deterministic for a given input: re-running with the same trades and
/// limits produces an identical result apart from `calculated_at`.
/// Trades must be in chronological order (streaks and drawdown depend
/// on it); the storage layer sorts on fetch.
pub fn evaluate(
    trader_id: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    trades: &[TradeRecord],
    limits: &RiskLimits,
) -> KpiScoreResult {
    let risk_discipline = risk_discipline_score(trades, limits);
    let consistency = consistency_score(trades);
    let strategy_execution = strategy_execution_score(trades);
    let profitability = profitability_score(trades);

    let total = total_score(risk_discipline, consistency, strategy_execution, profitability);

    let drawdown = max_drawdown(trades);
    let stats = expectancy(trades);

    let winning = trades.iter().filter(|t| t.is_winning()).count() as u32;
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        winning as f64 / trades.len() as f64 * 100.0
    };

    KpiScoreResult {
        trader_id: trader_id.to_string(),
        period_start,
        period_end,
        risk_discipline_score: risk_discipline,
        consistency_score: consistency,
        strategy_execution_score: strategy_execution,
        profitability_score: profitability,
        total_score: total,
        total_trades: trades.len() as u32,
        winning_trades: winning,
        win_rate,
        avg_r_multiple: stats.avg_r,
        max_drawdown: drawdown,
        expectancy: stats.expectancy,
        recommended_action: recommend(total, drawdown),
        calculated_at: Utc::now(),
    }
}
