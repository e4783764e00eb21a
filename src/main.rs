//! Trader Performance Scoring Engine
//!
//! Turns a trader's historical trade records and risk-limit configuration
//! into a normalized 0-100 composite KPI score plus a governance
//! recommendation (promote / maintain / retrain / suspend).

mod db;
mod engine;
mod models;
mod scoring;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::db::Database;
use crate::engine::{EngineConfig, ScoringEngine};
use crate::models::{KpiScoreResult, RiskLimits, TradeRecord};

/// Trader KPI scoring CLI.
#[derive(Parser)]
#[command(name = "traderkpi")]
#[command(about = "Score trader performance from trade history", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./traderkpi.db?mode=rwc"
    )]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a trader (or reactivate an existing one)
    AddTrader {
        /// Trader identifier
        trader_id: String,

        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
    },

    /// Deactivate a trader; batch runs will skip them
    Deactivate {
        /// Trader identifier
        trader_id: String,
    },

    /// List all active traders
    ListTraders,

    /// Show or set a trader's risk limits
    Limits {
        /// Trader identifier
        trader_id: String,

        /// Max risk per trade (%)
        #[arg(long)]
        max_risk: Option<f64>,

        /// Daily loss limit (%)
        #[arg(long)]
        daily_loss: Option<f64>,

        /// Weekly loss limit (%)
        #[arg(long)]
        weekly_loss: Option<f64>,
    },

    /// Import trade records from a JSON file
    Import {
        /// Path to a JSON array of trade records
        file: String,
    },

    /// Score a single trader for a period
    Score {
        /// Trader identifier
        #[arg(short, long)]
        trader: String,

        /// Period start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Period end date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Score every active trader for a period
    Batch {
        /// Period start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Period end date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: NaiveDate,

        /// Concurrent traders scored at once
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },

    /// Show the stored score for a trader and period
    Show {
        /// Trader identifier
        #[arg(short, long)]
        trader: String,

        /// Period start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Period end date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize database and engine
    let db = Arc::new(Database::new(&cli.database).await?);

    match cli.command {
        Commands::AddTrader { trader_id, name } => {
            db.save_trader(&trader_id, &name).await?;
            println!("Registered trader: {}", trader_id);
        }

        Commands::Deactivate { trader_id } => {
            db.deactivate_trader(&trader_id).await?;
            println!("Deactivated trader: {}", trader_id);
        }

        Commands::ListTraders => {
            let traders = db.get_active_traders().await?;
            if traders.is_empty() {
                println!("No active traders. Use 'traderkpi add-trader <id>' to add one.");
                return Ok(());
            }
            for trader_id in traders {
                println!("{}", trader_id);
            }
        }

        Commands::Limits {
            trader_id,
            max_risk,
            daily_loss,
            weekly_loss,
        } => {
            if max_risk.is_some() || daily_loss.is_some() || weekly_loss.is_some() {
                // Partial updates start from the current (or default) limits
                let current = db
                    .get_risk_limits(&trader_id)
                    .await?
                    .unwrap_or_default();
                let limits = RiskLimits {
                    max_risk_per_trade: max_risk.unwrap_or(current.max_risk_per_trade),
                    daily_loss_limit: daily_loss.unwrap_or(current.daily_loss_limit),
                    weekly_loss_limit: weekly_loss.unwrap_or(current.weekly_loss_limit),
                };
                db.set_risk_limits(&trader_id, &limits).await?;
                println!("Updated limits for {}", trader_id);
                print_limits(&limits, false);
            } else {
                match db.get_risk_limits(&trader_id).await? {
                    Some(limits) => print_limits(&limits, false),
                    None => print_limits(&RiskLimits::default(), true),
                }
            }
        }

        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let mut trades: Vec<TradeRecord> = serde_json::from_str(&raw)?;

            // Assign ids where the source omitted them, and sort so the
            // stored log is chronological regardless of input order
            for trade in &mut trades {
                if trade.id.is_empty() {
                    trade.id = uuid::Uuid::new_v4().to_string();
                }
            }
            trades.sort_by_key(|t| t.executed_at);

            for trade in &trades {
                db.save_trader(&trade.trader_id, "").await?;
                db.save_trade(trade).await?;
            }

            info!(count = trades.len(), file = %file, "Imported trades");
            println!("Imported {} trades from {}", trades.len(), file);
        }

        Commands::Score { trader, from, to } => {
            let engine = ScoringEngine::new(db.clone(), EngineConfig::default());
            let result = engine.score_trader(&trader, from, to).await?;
            print_result(&result);
        }

        Commands::Batch {
            from,
            to,
            concurrency,
        } => {
            let config = EngineConfig {
                batch_concurrency: concurrency,
                ..EngineConfig::default()
            };
            let engine = ScoringEngine::new(db.clone(), config);

            let entries = engine.run_batch(from, to).await?;
            if entries.is_empty() {
                println!("No active traders. Use 'traderkpi add-trader <id>' first.");
                return Ok(());
            }

            println!(
                "\n{:<24} {:>8} {:>8} {:>10}  {}",
                "TRADER", "TRADES", "SCORE", "ACTION", "ERROR"
            );
            println!("{}", "-".repeat(70));

            let mut failed = 0;
            for entry in &entries {
                match &entry.outcome {
                    Ok(result) => println!(
                        "{:<24} {:>8} {:>8.1} {:>10}",
                        entry.trader_id,
                        result.total_trades,
                        result.total_score,
                        result.recommended_action,
                    ),
                    Err(error) => {
                        failed += 1;
                        println!("{:<24} {:>8} {:>8} {:>10}  {}", entry.trader_id, "-", "-", "failed", error);
                    }
                }
            }

            println!(
                "\n{} scored, {} failed ({} to {})",
                entries.len() - failed,
                failed,
                from,
                to
            );
        }

        Commands::Show { trader, from, to } => {
            match db.get_score(&trader, from, to).await? {
                Some(result) => print_result(&result),
                None => println!(
                    "No stored score for {} over {} to {}. Run 'traderkpi score' first.",
                    trader, from, to
                ),
            }
        }
    }

    Ok(())
}

fn print_limits(limits: &RiskLimits, defaults: bool) {
    if defaults {
        println!("No limits configured; scoring uses the defaults:");
    }
    println!("  Max Risk/Trade:  {:.1}%", limits.max_risk_per_trade);
    println!("  Daily Loss:      {:.1}%", limits.daily_loss_limit);
    println!("  Weekly Loss:     {:.1}%", limits.weekly_loss_limit);
}

fn print_result(result: &KpiScoreResult) {
    println!("\n=== Trader: {} ===", result.trader_id);
    println!("Period: {} to {}", result.period_start, result.period_end);
    println!("Calculated: {}", result.calculated_at);

    println!("\n--- Sub-Scores ---");
    println!("Risk Discipline:     {:>6.1}  (weight 0.40)", result.risk_discipline_score);
    println!("Consistency:         {:>6.1}  (weight 0.25)", result.consistency_score);
    println!("Strategy Execution:  {:>6.1}  (weight 0.20)", result.strategy_execution_score);
    println!("Profitability:       {:>6.1}  (weight 0.15)", result.profitability_score);
    println!("Total Score:         {:>6.1} / 100", result.total_score);

    println!("\n--- Statistics ---");
    println!("Total Trades:   {}", result.total_trades);
    println!("Winning Trades: {}", result.winning_trades);
    println!("Win Rate:       {:.1}%", result.win_rate);
    println!("Avg R-Multiple: {:.2}", result.avg_r_multiple);
    println!("Max Drawdown:   {:.1}%", result.max_drawdown);
    println!("Expectancy:     {:.2}R", result.expectancy);

    println!("\nRecommended Action: {}", result.recommended_action);
}
