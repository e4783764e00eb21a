//! SQLite persistence for the scoring engine.
//!
//! Owns the trader registry, the trade log, per-trader risk limits, and the
//! KPI score results. This is the only I/O boundary: trades come out already
//! sorted chronologically (the scoring core requires it), and score writes
//! use upsert-overwrite semantics keyed by (trader_id, period_start,
//! period_end) — scoring is deterministic, so last-write-wins is safe.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::models::{
    KpiScoreResult, RiskLimits, TradeDirection, TradeRecord, TradeStatus,
};

/// Database connection pool with schema management.
pub struct Database {
    pool: SqlitePool,
}

/// Raw trade row; converted into a typed [`TradeRecord`] at fetch time.
#[derive(Debug, Clone, sqlx::FromRow)]
struct TradeRow {
    pub id: String,
    pub trader_id: String,
    pub pnl_percentage: Option<f64>,
    pub pnl_amount: Option<f64>,
    pub r_multiple: Option<f64>,
    pub risk_percentage: f64,
    pub rules_followed: Option<bool>,
    pub rule_violations: String,
    pub strategy_id: Option<String>,
    pub stop_loss: f64,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub direction: String,
    pub status: String,
    pub executed_at: DateTime<Utc>,
}

impl TradeRow {
    /// Build the typed record, rejecting rows with malformed enum or
    /// violation-tag columns. Construction happens once, here at the
    /// storage boundary; the scoring core never sees raw rows.
    fn into_record(self) -> Result<TradeRecord> {
        let direction = match self.direction.as_str() {
            "long" => TradeDirection::Long,
            "short" => TradeDirection::Short,
            other => anyhow::bail!("trade {}: unknown direction '{other}'", self.id),
        };

        let status = match self.status.as_str() {
            "open" => TradeStatus::Open,
            "closed" => TradeStatus::Closed,
            "cancelled" => TradeStatus::Cancelled,
            other => anyhow::bail!("trade {}: unknown status '{other}'", self.id),
        };

        let rule_violations: Vec<String> = serde_json::from_str(&self.rule_violations)
            .with_context(|| format!("trade {}: malformed rule_violations", self.id))?;

        Ok(TradeRecord {
            id: self.id,
            trader_id: self.trader_id,
            pnl_percentage: self.pnl_percentage,
            pnl_amount: self.pnl_amount.and_then(Decimal::from_f64),
            r_multiple: self.r_multiple,
            risk_percentage: self.risk_percentage,
            rules_followed: self.rules_followed,
            rule_violations,
            strategy_id: self.strategy_id,
            stop_loss: Decimal::from_f64(self.stop_loss).unwrap_or_default(),
            entry_price: Decimal::from_f64(self.entry_price).unwrap_or_default(),
            exit_price: self.exit_price.and_then(Decimal::from_f64),
            direction,
            status,
            executed_at: self.executed_at,
        })
    }
}

/// Stored KPI score row.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ScoreRow {
    pub trader_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub risk_discipline_score: f64,
    pub consistency_score: f64,
    pub strategy_execution_score: f64,
    pub profitability_score: f64,
    pub total_score: f64,
    pub total_trades: i64,
    pub winning_trades: i64,
    pub win_rate: f64,
    pub avg_r_multiple: f64,
    pub max_drawdown: f64,
    pub expectancy: f64,
    pub recommended_action: String,
    pub calculated_at: DateTime<Utc>,
}

impl ScoreRow {
    fn into_result(self) -> Result<KpiScoreResult> {
        Ok(KpiScoreResult {
            trader_id: self.trader_id,
            period_start: self.period_start,
            period_end: self.period_end,
            risk_discipline_score: self.risk_discipline_score,
            consistency_score: self.consistency_score,
            strategy_execution_score: self.strategy_execution_score,
            profitability_score: self.profitability_score,
            total_score: self.total_score,
            total_trades: self.total_trades as u32,
            winning_trades: self.winning_trades as u32,
            win_rate: self.win_rate,
            avg_r_multiple: self.avg_r_multiple,
            max_drawdown: self.max_drawdown,
            expectancy: self.expectancy,
            recommended_action: self.recommended_action.parse()?,
            calculated_at: self.calculated_at,
        })
    }
}

impl Database {
    /// Create a new database connection and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        // Trader registry
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS traders (
                trader_id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Trade log
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                trader_id TEXT NOT NULL,
                pnl_percentage REAL,
                pnl_amount REAL,
                r_multiple REAL,
                risk_percentage REAL NOT NULL,
                rules_followed INTEGER,
                rule_violations TEXT NOT NULL DEFAULT '[]',
                strategy_id TEXT,
                stop_loss REAL NOT NULL DEFAULT 0,
                entry_price REAL NOT NULL,
                exit_price REAL,
                direction TEXT NOT NULL,
                status TEXT NOT NULL,
                executed_at TEXT NOT NULL,
                FOREIGN KEY (trader_id) REFERENCES traders(trader_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Per-trader risk limits (at most one active record per trader)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS risk_limits (
                trader_id TEXT PRIMARY KEY,
                max_risk_per_trade REAL NOT NULL,
                daily_loss_limit REAL NOT NULL,
                weekly_loss_limit REAL NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (trader_id) REFERENCES traders(trader_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // KPI score results; one row per (trader, period), overwritten on recompute
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kpi_scores (
                trader_id TEXT NOT NULL,
                period_start TEXT NOT NULL,
                period_end TEXT NOT NULL,
                risk_discipline_score REAL NOT NULL,
                consistency_score REAL NOT NULL,
                strategy_execution_score REAL NOT NULL,
                profitability_score REAL NOT NULL,
                total_score REAL NOT NULL,
                total_trades INTEGER NOT NULL,
                winning_trades INTEGER NOT NULL,
                win_rate REAL NOT NULL,
                avg_r_multiple REAL NOT NULL,
                max_drawdown REAL NOT NULL,
                expectancy REAL NOT NULL,
                recommended_action TEXT NOT NULL,
                calculated_at TEXT NOT NULL,
                PRIMARY KEY (trader_id, period_start, period_end),
                FOREIGN KEY (trader_id) REFERENCES traders(trader_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_trader_time ON trades(trader_id, executed_at)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_kpi_scores_trader ON kpi_scores(trader_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ==================== Traders ====================

    /// Register a trader, or reactivate and rename an existing one.
    pub async fn save_trader(&self, trader_id: &str, display_name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO traders (trader_id, display_name)
            VALUES (?, ?)
            ON CONFLICT(trader_id) DO UPDATE SET
                display_name = COALESCE(NULLIF(excluded.display_name, ''), traders.display_name),
                is_active = 1,
                updated_at = datetime('now')
            "#,
        )
        .bind(trader_id)
        .bind(display_name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark a trader inactive; batch runs skip inactive traders.
    pub async fn deactivate_trader(&self, trader_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE traders SET is_active = 0, updated_at = datetime('now') WHERE trader_id = ?",
        )
        .bind(trader_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All active trader ids.
    pub async fn get_active_traders(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT trader_id FROM traders WHERE is_active = 1 ORDER BY trader_id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ==================== Trades ====================

    /// Insert or replace a trade record.
    pub async fn save_trade(&self, trade: &TradeRecord) -> Result<()> {
        let violations = serde_json::to_string(&trade.rule_violations)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO trades (
                id, trader_id, pnl_percentage, pnl_amount, r_multiple,
                risk_percentage, rules_followed, rule_violations, strategy_id,
                stop_loss, entry_price, exit_price, direction, status, executed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trade.id)
        .bind(&trade.trader_id)
        .bind(trade.pnl_percentage)
        .bind(trade.pnl_amount.and_then(|d| d.to_f64()))
        .bind(trade.r_multiple)
        .bind(trade.risk_percentage)
        .bind(trade.rules_followed)
        .bind(violations)
        .bind(&trade.strategy_id)
        .bind(trade.stop_loss.to_f64().unwrap_or(0.0))
        .bind(trade.entry_price.to_f64().unwrap_or(0.0))
        .bind(trade.exit_price.and_then(|d| d.to_f64()))
        .bind(trade.direction.as_str())
        .bind(trade.status.as_str())
        .bind(trade.executed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a trader's trades within [start, end], oldest first.
    ///
    /// Chronological order is a precondition of streak and drawdown
    /// analysis, so the sort lives here rather than in callers.
    pub async fn get_trades_in_period(
        &self,
        trader_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<TradeRecord>> {
        let rows: Vec<TradeRow> = sqlx::query_as(
            r#"
            SELECT * FROM trades
            WHERE trader_id = ?
              AND date(executed_at) >= date(?)
              AND date(executed_at) <= date(?)
            ORDER BY executed_at ASC
            "#,
        )
        .bind(trader_id)
        .bind(period_start)
        .bind(period_end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch trades")?;

        rows.into_iter().map(TradeRow::into_record).collect()
    }

    // ==================== Risk Limits ====================

    /// Set (or replace) a trader's risk limits.
    pub async fn set_risk_limits(&self, trader_id: &str, limits: &RiskLimits) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO risk_limits (trader_id, max_risk_per_trade, daily_loss_limit, weekly_loss_limit)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(trader_id) DO UPDATE SET
                max_risk_per_trade = excluded.max_risk_per_trade,
                daily_loss_limit = excluded.daily_loss_limit,
                weekly_loss_limit = excluded.weekly_loss_limit,
                updated_at = datetime('now')
            "#,
        )
        .bind(trader_id)
        .bind(limits.max_risk_per_trade)
        .bind(limits.daily_loss_limit)
        .bind(limits.weekly_loss_limit)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A trader's configured risk limits, if any. Callers substitute the
    /// documented defaults when this returns None.
    pub async fn get_risk_limits(&self, trader_id: &str) -> Result<Option<RiskLimits>> {
        let row: Option<(f64, f64, f64)> = sqlx::query_as(
            "SELECT max_risk_per_trade, daily_loss_limit, weekly_loss_limit FROM risk_limits WHERE trader_id = ?",
        )
        .bind(trader_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(max_risk, daily, weekly)| RiskLimits {
            max_risk_per_trade: max_risk,
            daily_loss_limit: daily,
            weekly_loss_limit: weekly,
        }))
    }

    // ==================== KPI Scores ====================

    /// Upsert a score result keyed by (trader, period_start, period_end).
    /// A conflicting write fully overwrites the previous row.
    pub async fn upsert_score(&self, result: &KpiScoreResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kpi_scores (
                trader_id, period_start, period_end,
                risk_discipline_score, consistency_score,
                strategy_execution_score, profitability_score, total_score,
                total_trades, winning_trades, win_rate, avg_r_multiple,
                max_drawdown, expectancy, recommended_action, calculated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(trader_id, period_start, period_end) DO UPDATE SET
                risk_discipline_score = excluded.risk_discipline_score,
                consistency_score = excluded.consistency_score,
                strategy_execution_score = excluded.strategy_execution_score,
                profitability_score = excluded.profitability_score,
                total_score = excluded.total_score,
                total_trades = excluded.total_trades,
                winning_trades = excluded.winning_trades,
                win_rate = excluded.win_rate,
                avg_r_multiple = excluded.avg_r_multiple,
                max_drawdown = excluded.max_drawdown,
                expectancy = excluded.expectancy,
                recommended_action = excluded.recommended_action,
                calculated_at = excluded.calculated_at
            "#,
        )
        .bind(&result.trader_id)
        .bind(result.period_start)
        .bind(result.period_end)
        .bind(result.risk_discipline_score)
        .bind(result.consistency_score)
        .bind(result.strategy_execution_score)
        .bind(result.profitability_score)
        .bind(result.total_score)
        .bind(result.total_trades as i64)
        .bind(result.winning_trades as i64)
        .bind(result.win_rate)
        .bind(result.avg_r_multiple)
        .bind(result.max_drawdown)
        .bind(result.expectancy)
        .bind(result.recommended_action.as_str())
        .bind(result.calculated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the stored score for a (trader, period) pair.
    pub async fn get_score(
        &self,
        trader_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<KpiScoreResult>> {
        let row: Option<ScoreRow> = sqlx::query_as(
            "SELECT * FROM kpi_scores WHERE trader_id = ? AND period_start = ? AND period_end = ?",
        )
        .bind(trader_id)
        .bind(period_start)
        .bind(period_end)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch score")?;

        row.map(ScoreRow::into_result).transpose()
    }

    /// In-memory database on a single-connection pool. A pooled
    /// `sqlite::memory:` gives every connection its own database, so
    /// tests pin the pool to one connection.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Corrupt a trade's violation column directly; test hook only.
    #[cfg(test)]
    pub async fn corrupt_trade_violations(&self, trade_id: &str) -> Result<()> {
        sqlx::query("UPDATE trades SET rule_violations = 'not-json' WHERE id = ?")
            .bind(trade_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get the connection pool (for advanced queries).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
