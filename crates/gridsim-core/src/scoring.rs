// Fantasy-point scoring: a fixed linear weight per stat category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Per-category stat counts for one player-game, keyed by category name.
pub type CategoryCounts = BTreeMap<String, f64>;

/// Ordered (category, weight) pairs, fixed for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    weights: Vec<(String, f64)>,
}

impl ScoringWeights {
    /// Build a weight vector, rejecting empty input, duplicate category names
    /// and non-finite weights.
    pub fn new(weights: Vec<(String, f64)>) -> SimResult<Self> {
        if weights.is_empty() {
            return Err(SimError::schema("no scoring categories configured"));
        }
        for (i, (name, weight)) in weights.iter().enumerate() {
            if weights[..i].iter().any(|(other, _)| other == name) {
                return Err(SimError::schema(format!("duplicate category `{name}`")));
            }
            if !weight.is_finite() {
                return Err(SimError::schema(format!(
                    "category `{name}` has non-finite weight {weight}"
                )));
            }
        }
        Ok(ScoringWeights { weights })
    }

    /// Category names in configured order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Fantasy points for one row: `Σ count[c] * weight[c]`.
    ///
    /// The row must carry exactly the weighted categories. A category missing
    /// from either side is a `SchemaMismatch`.
    pub fn score(&self, counts: &CategoryCounts) -> SimResult<f64> {
        if let Some(extra) = counts
            .keys()
            .find(|key| !self.weights.iter().any(|(name, _)| name == *key))
        {
            return Err(SimError::schema(format!(
                "category `{extra}` has no scoring weight"
            )));
        }

        let mut points = 0.0;
        for (name, weight) in &self.weights {
            let count = counts.get(name).ok_or_else(|| {
                SimError::schema(format!("row is missing category `{name}`"))
            })?;
            points += count * weight;
        }
        Ok(points)
    }
}
