//! Metric extractors: pure statistics over a trader's trade list.
//!
//! No side effects, no I/O. Every function tolerates an empty list by
//! returning a documented zero value; the sub-score calculators own the
//! actual empty-input fallbacks. Streak detection is the only extractor
//! that depends on trade order and expects chronological input.

use statrs::statistics::Statistics;

use crate::models::{RiskLimits, TradeRecord};

/// Longest winning and losing runs seen in a trade sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakLengths {
    pub longest_win: u32,
    pub longest_loss: u32,
}

/// Mean risk taken per trade relative to the configured ceiling.
/// A ratio of 1.0 means the trader risks exactly the allowed maximum.
pub fn average_risk_ratio(trades: &[TradeRecord], limits: &RiskLimits) -> f64 {
    if trades.is_empty() || limits.max_risk_per_trade <= 0.0 {
        return 0.0;
    }
    let mean_risk = trades
        .iter()
        .map(|t| t.risk_percentage)
        .collect::<Vec<_>>()
        .mean();
    mean_risk / limits.max_risk_per_trade
}

/// Fraction of trades that had a stop-loss set.
pub fn stop_loss_adherence(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let with_stop = trades.iter().filter(|t| t.has_stop_loss()).count();
    with_stop as f64 / trades.len() as f64
}

/// Total rule-violation tags across all trades.
pub fn violation_count(trades: &[TradeRecord]) -> usize {
    trades.iter().map(|t| t.rule_violations.len()).sum()
}

/// Fraction of trades explicitly reported as rules-followed.
/// An unreported flag counts against the rate, same as an explicit false.
pub fn rules_followed_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let followed = trades
        .iter()
        .filter(|t| t.rules_followed == Some(true))
        .count();
    followed as f64 / trades.len() as f64
}

/// Scan trades in the given order and record the longest winning and losing
/// runs, including the run still open at the end of the scan.
///
/// A trade counts as winning when its realized P&L is strictly positive;
/// zero, negative, or unrecorded P&L all extend a losing run.
pub fn streaks(trades: &[TradeRecord]) -> StreakLengths {
    let mut out = StreakLengths::default();
    let mut current_win = 0u32;
    let mut current_loss = 0u32;

    for trade in trades {
        if trade.is_winning() {
            current_win += 1;
            current_loss = 0;
        } else {
            current_loss += 1;
            current_win = 0;
        }
        out.longest_win = out.longest_win.max(current_win);
        out.longest_loss = out.longest_loss.max(current_loss);
    }

    out
}

/// Population variance of per-trade risk percentage.
pub fn position_size_variance(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades
        .iter()
        .map(|t| t.risk_percentage)
        .collect::<Vec<_>>()
        .population_variance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_trade;
    use rust_decimal_macros::dec;

    #[test]
    fn test_average_risk_ratio() {
        let trades = vec![
            closed_trade("t1", Some(dec!(10)), 1.0),
            closed_trade("t2", Some(dec!(-5)), 3.0),
        ];
        let limits = RiskLimits::default(); // max 2%
        // mean(1, 3) = 2, ratio 1.0
        assert!((average_risk_ratio(&trades, &limits) - 1.0).abs() < 1e-9);
        assert_eq!(average_risk_ratio(&[], &limits), 0.0);
    }

    #[test]
    fn test_stop_loss_adherence() {
        let mut with_stop = closed_trade("t1", Some(dec!(10)), 1.0);
        with_stop.stop_loss = dec!(95);
        let without_stop = closed_trade("t2", Some(dec!(10)), 1.0);

        let trades = vec![with_stop, without_stop];
        assert!((stop_loss_adherence(&trades) - 0.5).abs() < 1e-9);
        assert_eq!(stop_loss_adherence(&[]), 0.0);
    }

    #[test]
    fn test_violation_count_sums_tags() {
        let mut a = closed_trade("t1", Some(dec!(10)), 1.0);
        a.rule_violations = vec!["oversized".into(), "no-stop".into()];
        let mut b = closed_trade("t2", Some(dec!(10)), 1.0);
        b.rule_violations = vec!["late-entry".into()];

        assert_eq!(violation_count(&[a, b]), 3);
    }

    #[test]
    fn test_rules_followed_rate_treats_unreported_as_not_followed() {
        let mut a = closed_trade("t1", Some(dec!(10)), 1.0);
        a.rules_followed = Some(true);
        let mut b = closed_trade("t2", Some(dec!(10)), 1.0);
        b.rules_followed = Some(false);
        let mut c = closed_trade("t3", Some(dec!(10)), 1.0);
        c.rules_followed = None;

        let rate = rules_followed_rate(&[a, b, c]);
        assert!((rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_streak_detection() {
        // Signs: + + - - - - +  => longest win 2, longest loss 4
        let signs = [10i64, 10, -5, -5, -5, -5, 10];
        let trades: Vec<_> = signs
            .iter()
            .enumerate()
            .map(|(i, s)| closed_trade(&format!("t{i}"), Some((*s).into()), 1.0))
            .collect();

        let s = streaks(&trades);
        assert_eq!(s.longest_win, 2);
        assert_eq!(s.longest_loss, 4);
    }

    #[test]
    fn test_streak_counts_trailing_run() {
        let trades = vec![
            closed_trade("t1", Some(dec!(-5)), 1.0),
            closed_trade("t2", Some(dec!(10)), 1.0),
            closed_trade("t3", Some(dec!(10)), 1.0),
            closed_trade("t4", Some(dec!(10)), 1.0),
        ];
        assert_eq!(streaks(&trades).longest_win, 3);
    }

    #[test]
    fn test_unrecorded_pnl_extends_losing_run() {
        let trades = vec![
            closed_trade("t1", None, 1.0),
            closed_trade("t2", Some(dec!(-1)), 1.0),
        ];
        assert_eq!(streaks(&trades).longest_loss, 2);
    }

    #[test]
    fn test_position_size_variance_uniform_is_zero() {
        let trades = vec![
            closed_trade("t1", Some(dec!(10)), 1.5),
            closed_trade("t2", Some(dec!(10)), 1.5),
            closed_trade("t3", Some(dec!(10)), 1.5),
        ];
        assert!(position_size_variance(&trades).abs() < 1e-9);
    }

    #[test]
    fn test_position_size_variance_population() {
        // Population variance of [1, 3] is 1.0
        let trades = vec![
            closed_trade("t1", Some(dec!(10)), 1.0),
            closed_trade("t2", Some(dec!(10)), 3.0),
        ];
        assert!((position_size_variance(&trades) - 1.0).abs() < 1e-9);
    }
}
