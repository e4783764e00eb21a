//! Recommendation policy: maps (total score, max drawdown) to a verdict.

use crate::models::RecommendedAction;

/// Drawdown percentage above which a trader is suspended outright.
pub const SUSPEND_DRAWDOWN_PCT: f64 = 20.0;

/// Decide the governance action for a composite score and max drawdown.
///
/// The drawdown check runs first and short-circuits everything else:
/// capital protection overrides any score. The remaining thresholds are
/// evaluated in order: below 40 retrain, below 60 maintain, 80 and above
/// promote, and the 60-80 band maintains.
pub fn recommend(total_score: f64, max_drawdown: f64) -> RecommendedAction {
    if max_drawdown > SUSPEND_DRAWDOWN_PCT {
        RecommendedAction::Suspend
    } else if total_score < 40.0 {
        RecommendedAction::Retrain
    } else if total_score < 60.0 {
        RecommendedAction::Maintain
    } else if total_score >= 80.0 {
        RecommendedAction::Promote
    } else {
        RecommendedAction::Maintain
    }
}
