// Certainty-equivalent utility of a scoring distribution.
//
// The certainty equivalent is the geometric mean of (1 + points), minus one.
// Because the log transform is concave it never exceeds the arithmetic mean,
// and it falls further below it the more volatile a player is. A zero-point
// game drags it down far more than a big game lifts it.

use crate::error::{SimError, SimResult};
use crate::stats;

/// Values below this bound have no logarithm after the `1 + v` shift.
pub const MIN_SCORE: f64 = -1.0;

/// Threshold below which a points-per-game mean is treated as zero.
const PPG_EPSILON: f64 = 1e-12;

/// `exp(mean(ln(1 + v_i))) - 1`.
///
/// Fails with `InvalidScore` on an empty sequence or on any value that is
/// non-finite or below -1.
pub fn certainty_equivalent(values: &[f64]) -> SimResult<f64> {
    if values.is_empty() {
        return Err(SimError::invalid_score("empty scoring sequence"));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < MIN_SCORE) {
        return Err(SimError::invalid_score(format!(
            "score {bad} is outside the certainty-equivalent domain (>= {MIN_SCORE})"
        )));
    }
    let log_mean = values.iter().map(|v| v.ln_1p()).sum::<f64>() / values.len() as f64;
    Ok(log_mean.exp_m1())
}

/// Ratio of utility to points per game: 1.0 for a perfectly steady scorer,
/// lower as variance grows.
///
/// A zero mean has no meaningful ratio; a steady zero scorer (utility also
/// zero) reports 1.0 and anything else reports 0.0.
pub fn consistency(utility: f64, points_per_game: f64) -> f64 {
    if points_per_game.abs() < PPG_EPSILON {
        return if utility.abs() < PPG_EPSILON { 1.0 } else { 0.0 };
    }
    utility / points_per_game
}

/// Points per game, utility and consistency for one scoring history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringProfile {
    pub points_per_game: f64,
    pub utility: f64,
    pub consistency: f64,
}

impl ScoringProfile {
    pub fn from_scores(values: &[f64]) -> SimResult<Self> {
        let utility = certainty_equivalent(values)?;
        // certainty_equivalent already rejected the empty case
        let points_per_game = stats::mean(values).unwrap_or(0.0);
        Ok(ScoringProfile {
            points_per_game,
            utility,
            consistency: consistency(utility, points_per_game),
        })
    }
}
