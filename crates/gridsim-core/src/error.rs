// Error type shared by every stage of the simulation pipeline.

use thiserror::Error;

use crate::position::Position;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Scoring categories in a game-log row do not line up with the weights.
    #[error("scoring schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A scoring sequence is empty or contains a value outside the
    /// certainty-equivalent domain (`v >= -1`).
    #[error("invalid score: {message}")]
    InvalidScore { message: String },

    /// A derived table was queried before the stage that builds it ran.
    #[error("not ready: {what} requested before it was built")]
    NotReady { what: String },

    #[error("unknown injury policy `{policy}` (expected zeros, recycle, impute or normal)")]
    UnknownPolicy { policy: String },

    #[error(
        "insufficient player pool at {position}: need {needed} eligible players, found {available}"
    )]
    InsufficientPlayerPool {
        position: Position,
        needed: usize,
        available: usize,
    },

    #[error("invalid setting `{field}`: {message}")]
    InvalidSettings { field: String, message: String },
}

impl SimError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        SimError::SchemaMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_score(message: impl Into<String>) -> Self {
        SimError::InvalidScore {
            message: message.into(),
        }
    }

    pub(crate) fn settings(field: &str, message: impl Into<String>) -> Self {
        SimError::InvalidSettings {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
