// Missing-games imputation: stretch a player's history to a full season.
//
// Players rarely appear in every week of the source data. Before a season is
// simulated, each rostered player's history is padded (or replaced) out to
// `season_length` entries under the configured policy, then shuffled so the
// order of games carries no positional meaning.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::stats;

/// How missing games are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryPolicy {
    /// Missing games score zero.
    #[default]
    Zeros,
    /// Missing games are resampled, with replacement, from the history.
    Recycle,
    /// Missing games are drawn from |N(mean, stdev)| of the history.
    Impute,
    /// The whole season is drawn from |N(mean, stdev)|; the history itself is
    /// discarded.
    Normal,
}

impl InjuryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjuryPolicy::Zeros => "zeros",
            InjuryPolicy::Recycle => "recycle",
            InjuryPolicy::Impute => "impute",
            InjuryPolicy::Normal => "normal",
        }
    }
}

impl fmt::Display for InjuryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InjuryPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zeros" => Ok(InjuryPolicy::Zeros),
            "recycle" => Ok(InjuryPolicy::Recycle),
            "impute" => Ok(InjuryPolicy::Impute),
            "normal" => Ok(InjuryPolicy::Normal),
            _ => Err(SimError::UnknownPolicy {
                policy: s.to_string(),
            }),
        }
    }
}

/// Build one season's worth of scores from a player's history.
///
/// The result always has exactly `season_length` entries. A history longer
/// than the season is truncated to its first `season_length` games (except
/// under `Normal`, which ignores the history values). Fails with
/// `InvalidScore` on an empty history.
pub fn impute_season<R: Rng + ?Sized>(
    history: &[f64],
    season_length: usize,
    policy: InjuryPolicy,
    rng: &mut R,
) -> SimResult<Vec<f64>> {
    if history.is_empty() {
        return Err(SimError::invalid_score("cannot impute from an empty history"));
    }

    let kept = history.len().min(season_length);
    let missing = season_length - kept;

    let mut season: Vec<f64> = match policy {
        InjuryPolicy::Zeros => {
            let mut season = history[..kept].to_vec();
            season.resize(season_length, 0.0);
            season
        }
        InjuryPolicy::Recycle => {
            let mut season = history[..kept].to_vec();
            season.extend((0..missing).map(|_| history[rng.gen_range(0..history.len())]));
            season
        }
        InjuryPolicy::Impute => {
            let normal = fitted_normal(history)?;
            let mut season = history[..kept].to_vec();
            season.extend((0..missing).map(|_| normal.sample(rng).abs()));
            season
        }
        InjuryPolicy::Normal => {
            let normal = fitted_normal(history)?;
            (0..season_length).map(|_| normal.sample(rng).abs()).collect()
        }
    };

    season.shuffle(rng);
    Ok(season)
}

/// Normal distribution with the history's mean and population stdev.
fn fitted_normal(history: &[f64]) -> SimResult<Normal<f64>> {
    let moments = stats::moments(history)
        .ok_or_else(|| SimError::invalid_score("cannot fit a distribution to an empty history"))?;
    Normal::new(moments.mean, moments.stdev).map_err(|e| {
        SimError::invalid_score(format!(
            "cannot fit normal(mean={}, stdev={}): {e}",
            moments.mean, moments.stdev
        ))
    })
}
