//! Shared builders for unit tests.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{TradeDirection, TradeRecord, TradeStatus};

/// A plain closed trade with sensible defaults; tests override the fields
/// they care about. Trades built in sequence get increasing timestamps so
/// list order matches chronological order.
pub fn closed_trade(id: &str, pnl_amount: Option<Decimal>, risk_percentage: f64) -> TradeRecord {
    // Spread timestamps by hashing the id suffix so repeated builders
    // don't collide; tests that need exact ordering pass ordered ids.
    let offset = id
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0i64, |acc, d| acc * 10 + d as i64);

    TradeRecord {
        id: id.to_string(),
        trader_id: "trader-1".to_string(),
        pnl_percentage: None,
        pnl_amount,
        r_multiple: None,
        risk_percentage,
        rules_followed: Some(true),
        rule_violations: vec![],
        strategy_id: None,
        stop_loss: Decimal::ZERO,
        entry_price: dec!(100),
        exit_price: Some(dec!(101)),
        direction: TradeDirection::Long,
        status: TradeStatus::Closed,
        executed_at: Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap() + Duration::hours(offset),
    }
}
