//! Sequential-state analyzers: drawdown and expectancy.
//!
//! Both walk the trade list once. The drawdown scan depends on trade order
//! and expects chronological input; expectancy is order-independent.

use statrs::statistics::Statistics;

use crate::models::TradeRecord;

/// Expectancy statistics over closed trades with a recorded R-multiple.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpectancyStats {
    /// Closed trades with a recorded R
    pub closed_count: u32,

    /// Winners among those (realized P&L strictly positive)
    pub winning_count: u32,

    /// winning_count / closed_count (0.0 with no closed trades)
    pub win_rate: f64,

    /// Mean R over winners (0.0 with no winners)
    pub avg_win_r: f64,

    /// Mean |R| over losers (0.0 with no losers)
    pub avg_loss_r: f64,

    /// win_rate * avg_win_r - (1 - win_rate) * avg_loss_r
    pub expectancy: f64,

    /// Mean R over all closed trades with a recorded R
    pub avg_r: f64,
}

/// Largest peak-to-trough decline of the cumulative P&L-percentage curve.
///
/// Walks trades in the supplied order, accumulating `pnl_percentage`
/// (unrecorded values contribute 0) and tracking the running peak; the
/// result is the largest peak-minus-cumulative gap seen, never negative.
pub fn max_drawdown(trades: &[TradeRecord]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = 0.0;
    let mut max_dd = 0.0;

    for trade in trades {
        cumulative += trade.pnl_percentage.unwrap_or(0.0);
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = peak - cumulative;
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Win/loss expectancy over closed trades with a recorded R-multiple.
///
/// Zero such trades yields the zeroed stats (expectancy 0), not an error.
pub fn expectancy(trades: &[TradeRecord]) -> ExpectancyStats {
    let closed: Vec<&TradeRecord> = trades
        .iter()
        .filter(|t| t.closed_r().is_some())
        .collect();

    if closed.is_empty() {
        return ExpectancyStats::default();
    }

    let (winners, losers): (Vec<&TradeRecord>, Vec<&TradeRecord>) =
        closed.iter().copied().partition(|t| t.is_winning());

    let win_rate = winners.len() as f64 / closed.len() as f64;

    let avg_win_r = if winners.is_empty() {
        0.0
    } else {
        winners
            .iter()
            .filter_map(|t| t.closed_r())
            .collect::<Vec<_>>()
            .mean()
    };

    let avg_loss_r = if losers.is_empty() {
        0.0
    } else {
        losers
            .iter()
            .filter_map(|t| t.closed_r())
            .map(f64::abs)
            .collect::<Vec<_>>()
            .mean()
    };

    let avg_r = closed
        .iter()
        .filter_map(|t| t.closed_r())
        .collect::<Vec<_>>()
        .mean();

    ExpectancyStats {
        closed_count: closed.len() as u32,
        winning_count: winners.len() as u32,
        win_rate,
        avg_win_r,
        avg_loss_r,
        expectancy: win_rate * avg_win_r - (1.0 - win_rate) * avg_loss_r,
        avg_r,
    }
}
