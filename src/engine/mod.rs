//! Scoring engine: wires storage to the pure scoring pipeline.
//!
//! Two entry points, mirroring the external API surface:
//! - [`ScoringEngine::score_trader`] scores one trader and propagates errors
//!   to the caller;
//! - [`ScoringEngine::run_batch`] scores every active trader for a period,
//!   capturing per-trader failures so one bad trader never aborts the rest.

mod config;

pub use config::EngineConfig;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::models::KpiScoreResult;
use crate::scoring;

/// Outcome of scoring one trader within a batch run.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub trader_id: String,
    /// The persisted result, or the error message for this trader
    pub outcome: Result<KpiScoreResult, String>,
}

impl BatchEntry {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Scoring engine over a shared database handle.
pub struct ScoringEngine {
    db: Arc<Database>,
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(db: Arc<Database>, config: EngineConfig) -> Self {
        Self { db, config }
    }

    /// Score one trader for a period and persist the result.
    ///
    /// Fetches the trader's trades (chronologically ordered by the storage
    /// layer) and risk limits, substituting the configured defaults when no
    /// limits record exists. The write is an upsert on
    /// (trader_id, period_start, period_end): recomputing overwrites.
    pub async fn score_trader(
        &self,
        trader_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<KpiScoreResult> {
        let trades = self
            .db
            .get_trades_in_period(trader_id, period_start, period_end)
            .await
            .with_context(|| format!("fetching trades for {trader_id}"))?;

        let limits = match self.db.get_risk_limits(trader_id).await? {
            Some(limits) => limits,
            None => {
                debug!(trader = %trader_id, "No risk limits configured, using defaults");
                self.config.default_limits
            }
        };

        let result = scoring::evaluate(trader_id, period_start, period_end, &trades, &limits);

        self.db
            .upsert_score(&result)
            .await
            .with_context(|| format!("persisting score for {trader_id}"))?;

        info!(
            trader = %trader_id,
            trades = result.total_trades,
            total = result.total_score,
            action = %result.recommended_action,
            "Scored trader"
        );

        Ok(result)
    }

    /// Score every active trader for a period.
    ///
    /// Traders are processed through a bounded worker pool; each failure is
    /// captured as an error entry and the rest of the batch continues. The
    /// returned list has one entry per active trader, in no particular order.
    pub async fn run_batch(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<BatchEntry>> {
        let traders = self.db.get_active_traders().await?;
        info!(traders = traders.len(), "Starting batch scoring run");

        let entries: Vec<BatchEntry> = stream::iter(traders)
            .map(|trader_id| async move {
                match self
                    .score_trader(&trader_id, period_start, period_end)
                    .await
                {
                    Ok(result) => BatchEntry {
                        trader_id,
                        outcome: Ok(result),
                    },
                    Err(e) => {
                        warn!(trader = %trader_id, error = %e, "Trader scoring failed");
                        BatchEntry {
                            trader_id,
                            outcome: Err(format!("{e:#}")),
                        }
                    }
                }
            })
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let failed = entries.iter().filter(|e| !e.is_success()).count();
        info!(
            scored = entries.len() - failed,
            failed = failed,
            "Batch scoring run finished"
        );

        Ok(entries)
    }
}
