// Library root: the season-simulation engine.
//
// Pipeline, leaves first: scoring -> players -> certainty / tiering ->
// imputer -> roster -> season -> aggregate, driven by `league::League`.

pub mod aggregate;
pub mod certainty;
pub mod error;
pub mod ids;
pub mod imputer;
pub mod league;
pub mod players;
pub mod position;
pub mod roster;
pub mod scoring;
pub mod season;
pub mod stats;
pub mod tiering;

pub use aggregate::{PlayerSummary, TeamSummary};
pub use error::{SimError, SimResult};
pub use ids::{IdAllocator, PlayerId, SeasonId, TeamId};
pub use imputer::InjuryPolicy;
pub use league::{League, LeagueSettings, SimulationResults};
pub use players::{PlayerDb, PlayerRecord, RawGameLog};
pub use position::{Position, Slot};
pub use roster::{AssignmentMode, TeamRecord};
pub use scoring::{CategoryCounts, ScoringWeights};
pub use season::{rank_scores, SeasonOutcome};
pub use tiering::TierMetric;
