//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::models::RiskLimits;

/// Configuration for the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many traders a batch run scores concurrently.
    /// Safe to raise: each trader's computation and write touch disjoint rows.
    pub batch_concurrency: usize,

    /// Limits substituted for traders with no configured risk-limit record
    pub default_limits: RiskLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 8,
            default_limits: RiskLimits::default(),
        }
    }
}
