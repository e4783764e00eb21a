//! Sub-score calculators: four independent 0-100 evaluations.
//!
//! Each scorer maps extracted metrics to a clamped 0-100 value with an
//! explicit fallback for missing data (see the per-function docs). The
//! weighted composite is assembled by [`total_score`].

use statrs::statistics::Statistics;

use crate::models::{RiskLimits, TradeRecord, TradeStatus};

use super::metrics;

/// Sub-score weights for the composite.
pub const WEIGHT_RISK_DISCIPLINE: f64 = 0.40;
pub const WEIGHT_CONSISTENCY: f64 = 0.25;
pub const WEIGHT_STRATEGY_EXECUTION: f64 = 0.20;
pub const WEIGHT_PROFITABILITY: f64 = 0.15;

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Risk discipline: how well the trader stays inside their risk limits.
///
/// Starts at 100 and applies, in order: an over/under-risk penalty against
/// the configured per-trade ceiling, a proportional stop-loss adherence
/// multiplier (a missing stop is a systemic defect, not an additive one),
/// a violation-count penalty, and a rules-followed multiplier floored at
/// 0.5. No trades means no demonstrated discipline: score 0.
pub fn risk_discipline_score(trades: &[TradeRecord], limits: &RiskLimits) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }

    let mut score = 100.0;

    let risk_ratio = metrics::average_risk_ratio(trades, limits);
    if risk_ratio > 1.0 {
        score -= (40.0_f64).min((risk_ratio - 1.0) * 40.0);
    } else if risk_ratio < 0.8 {
        // Chronic under-utilization of allowed risk, small flat penalty
        score -= 5.0;
    }

    score *= metrics::stop_loss_adherence(trades);

    let violations = metrics::violation_count(trades);
    score -= (30.0_f64).min(violations as f64 * 5.0);

    score *= 0.5 + 0.5 * metrics::rules_followed_rate(trades);

    clamp_score(score)
}

/// Consistency: penalizes long losing streaks and erratic position sizing.
///
/// Fewer than 5 trades is insufficient evidence and returns a neutral 50
/// rather than a penalty.
pub fn consistency_score(trades: &[TradeRecord]) -> f64 {
    if trades.len() < 5 {
        return 50.0;
    }

    let mut score = 100.0;

    let streaks = metrics::streaks(trades);
    if streaks.longest_loss > 3 {
        // Long losing runs are a revenge-trading proxy
        score -= (streaks.longest_loss - 3) as f64 * 10.0;
    }

    let variance = metrics::position_size_variance(trades);
    if variance > 1.0 {
        score -= (20.0_f64).min(variance * 5.0);
    }

    clamp_score(score)
}

/// Strategy execution: strategy tagging discipline and clean trade closure.
///
/// The proper-execution rate is closed / (closed + cancelled); with no
/// closed or cancelled trades the rate is 1.0 (full credit).
/// Empty trade list scores 0.
pub fn strategy_execution_score(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }

    let mut score = 100.0;

    let tagged = trades.iter().filter(|t| t.strategy_id.is_some()).count();
    score *= tagged as f64 / trades.len() as f64;

    let closed = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Closed)
        .count();
    let cancelled = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Cancelled)
        .count();
    let proper_rate = if closed + cancelled == 0 {
        1.0
    } else {
        closed as f64 / (closed + cancelled) as f64
    };
    score *= 0.5 + 0.5 * proper_rate;

    clamp_score(score)
}

/// Profitability: average R-multiple over closed trades, centered at 50.
///
/// Only closed trades with a recorded R count; with none the score is a
/// neutral 50. Each unit of average R moves the score 25 points, capped
/// at the 0/100 bounds.
pub fn profitability_score(trades: &[TradeRecord]) -> f64 {
    let rs: Vec<f64> = trades.iter().filter_map(|t| t.closed_r()).collect();
    if rs.is_empty() {
        return 50.0;
    }

    let avg_r = rs.mean();
    let mut score = 50.0;
    if avg_r > 0.0 {
        score += (50.0_f64).min(avg_r * 25.0);
    } else {
        score += (-50.0_f64).max(avg_r * 25.0);
    }

    clamp_score(score)
}

/// Weighted composite of the four sub-scores.
///
/// Inputs are already in [0, 100] and the weights sum to 1, so the result
/// needs no further clamping.
pub fn total_score(
    risk_discipline: f64,
    consistency: f64,
    strategy_execution: f64,
    profitability: f64,
) -> f64 {
    WEIGHT_RISK_DISCIPLINE * risk_discipline
        + WEIGHT_CONSISTENCY * consistency
        + WEIGHT_STRATEGY_EXECUTION * strategy_execution
        + WEIGHT_PROFITABILITY * profitability
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_trade;
    use rust_decimal_macros::dec;

    fn disciplined_trade(id: &str, risk_pct: f64) -> TradeRecord {
        let mut t = closed_trade(id, Some(dec!(10)), risk_pct);
        t.stop_loss = dec!(95);
        t.rules_followed = Some(true);
        t
    }

    #[test]
    fn test_risk_discipline_empty_is_zero() {
        assert_eq!(risk_discipline_score(&[], &RiskLimits::default()), 0.0);
    }

    #[test]
    fn test_risk_discipline_neutral_ratio_scores_full() {
        // risk 2% against a 2% ceiling, stop set, rules followed, no violations
        let trades = vec![disciplined_trade("t1", 2.0)];
        let score = risk_discipline_score(&trades, &RiskLimits::default());
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_discipline_over_risk_penalty() {
        // ratio 2.0 -> -min(40, 40) = 60 before multipliers, which are all 1
        let trades = vec![disciplined_trade("t1", 4.0)];
        let score = risk_discipline_score(&trades, &RiskLimits::default());
        assert!((score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_discipline_under_utilization_flat_penalty() {
        // ratio 0.5 < 0.8 -> flat -5
        let trades = vec![disciplined_trade("t1", 1.0)];
        let score = risk_discipline_score(&trades, &RiskLimits::default());
        assert!((score - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_discipline_no_stop_zeroes_score() {
        let mut t = disciplined_trade("t1", 2.0);
        t.stop_loss = dec!(0);
        assert_eq!(risk_discipline_score(&[t], &RiskLimits::default()), 0.0);
    }

    #[test]
    fn test_risk_discipline_violation_and_rules_penalties() {
        let mut t = disciplined_trade("t1", 2.0);
        t.rule_violations = vec!["oversized".into(), "late-exit".into()];
        t.rules_followed = Some(false);
        // 100 - 10 violations = 90, then * 0.5 rules floor = 45
        let score = risk_discipline_score(&[t], &RiskLimits::default());
        assert!((score - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_insufficient_sample_is_neutral() {
        let trades: Vec<_> = (0..4)
            .map(|i| closed_trade(&format!("t{i}"), Some(dec!(10)), 1.0))
            .collect();
        assert_eq!(consistency_score(&trades), 50.0);
        assert_eq!(consistency_score(&[]), 50.0);
    }

    #[test]
    fn test_consistency_losing_streak_penalty() {
        // + + - - - - +  -> longest loss 4 -> penalty (4-3)*10 = 10
        let signs = [10i64, 10, -5, -5, -5, -5, 10];
        let trades: Vec<_> = signs
            .iter()
            .enumerate()
            .map(|(i, s)| closed_trade(&format!("t{i}"), Some((*s).into()), 1.0))
            .collect();
        assert!((consistency_score(&trades) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_sizing_variance_penalty() {
        // risks [1, 1, 5, 5, 1]: mean 2.6, population variance 3.84 > 1
        // penalty min(20, 19.2) = 19.2
        let risks = [1.0, 1.0, 5.0, 5.0, 1.0];
        let trades: Vec<_> = risks
            .iter()
            .enumerate()
            .map(|(i, r)| closed_trade(&format!("t{i}"), Some(dec!(10)), *r))
            .collect();
        assert!((consistency_score(&trades) - 80.8).abs() < 1e-6);
    }

    #[test]
    fn test_strategy_execution_empty_is_zero() {
        assert_eq!(strategy_execution_score(&[]), 0.0);
    }

    #[test]
    fn test_strategy_execution_full_credit() {
        let mut t = closed_trade("t1", Some(dec!(10)), 1.0);
        t.strategy_id = Some("breakout".into());
        assert!((strategy_execution_score(&[t]) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_strategy_execution_untagged_and_cancelled() {
        let mut tagged = closed_trade("t1", Some(dec!(10)), 1.0);
        tagged.strategy_id = Some("breakout".into());
        let untagged = closed_trade("t2", Some(dec!(10)), 1.0);
        let mut cancelled = closed_trade("t3", None, 1.0);
        cancelled.status = TradeStatus::Cancelled;
        cancelled.strategy_id = Some("breakout".into());

        // tagged 2/3, proper rate 2/3 -> 100 * 2/3 * (0.5 + 1/3) = 55.555...
        let score = strategy_execution_score(&[tagged, untagged, cancelled]);
        assert!((score - 100.0 * (2.0 / 3.0) * (0.5 + 1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_strategy_execution_all_open_gets_full_execution_credit() {
        let mut t = closed_trade("t1", None, 1.0);
        t.status = TradeStatus::Open;
        t.strategy_id = Some("swing".into());
        // no closed or cancelled trades: proper rate treated as 1.0
        assert!((strategy_execution_score(&[t]) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_profitability_no_closed_r_is_neutral() {
        assert_eq!(profitability_score(&[]), 50.0);
        let mut open = closed_trade("t1", None, 1.0);
        open.status = TradeStatus::Open;
        open.r_multiple = Some(2.0);
        assert_eq!(profitability_score(&[open]), 50.0);
    }

    #[test]
    fn test_profitability_scales_with_avg_r() {
        let mut winner = closed_trade("t1", Some(dec!(10)), 1.0);
        winner.r_multiple = Some(1.0);
        // 50 + 25 = 75
        assert!((profitability_score(&[winner.clone()]) - 75.0).abs() < 1e-9);

        let mut loser = closed_trade("t2", Some(dec!(-10)), 1.0);
        loser.r_multiple = Some(-3.0);
        // 50 + max(-50, -75) = 0
        assert!((profitability_score(&[loser]) - 0.0).abs() < 1e-9);

        let mut big = winner;
        big.r_multiple = Some(5.0);
        // 50 + min(50, 125) = 100
        assert!((profitability_score(&[big]) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_score_weights() {
        let total = total_score(0.0, 50.0, 0.0, 50.0);
        assert!((total - 20.0).abs() < 1e-9);
        assert!((total_score(100.0, 100.0, 100.0, 100.0) - 100.0).abs() < 1e-9);
    }
}
