// Position tiering: rank each position's players and cut the ranking into
// league-sized bands.
//
// Rank 0..L-1 at a position is tier 1 (slot `<pos>1`), the next L players are
// tier 2, and so on. Every tier except possibly the last has exactly
// `league_size` members.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::ids::PlayerId;
use crate::players::PlayerRecord;
use crate::position::{Position, Slot};

// ---------------------------------------------------------------------------
// Ranking metric
// ---------------------------------------------------------------------------

/// Which derived statistic orders players within a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMetric {
    #[default]
    PointsPerGame,
    Utility,
    Consistency,
}

impl TierMetric {
    pub fn value(&self, player: &PlayerRecord) -> f64 {
        match self {
            TierMetric::PointsPerGame => player.points_per_game,
            TierMetric::Utility => player.utility,
            TierMetric::Consistency => player.consistency,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TierMetric::PointsPerGame => "points_per_game",
            TierMetric::Utility => "utility",
            TierMetric::Consistency => "consistency",
        }
    }
}

impl fmt::Display for TierMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierMetric {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "points_per_game" | "ppg" => Ok(TierMetric::PointsPerGame),
            "utility" => Ok(TierMetric::Utility),
            "consistency" => Ok(TierMetric::Consistency),
            other => Err(SimError::settings(
                "tier_metric",
                format!("unknown metric `{other}`"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tier table
// ---------------------------------------------------------------------------

/// Where one qualified player landed in its position's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAssignment {
    /// 1-based rank within the position.
    pub position_rank: usize,
    pub slot: Slot,
}

/// Result of tiering every requested position.
#[derive(Debug, Clone)]
pub struct TierTable {
    league_size: usize,
    metric: TierMetric,
    assignments: HashMap<PlayerId, TierAssignment>,
    /// Members of each slot, best first.
    by_slot: BTreeMap<Slot, Vec<PlayerId>>,
}

impl TierTable {
    pub fn league_size(&self) -> usize {
        self.league_size
    }

    pub fn metric(&self) -> TierMetric {
        self.metric
    }

    pub fn assignment(&self, id: PlayerId) -> Option<&TierAssignment> {
        self.assignments.get(&id)
    }

    /// Players in a slot's tier, ordered by position rank. Empty if the tier
    /// does not exist.
    pub fn slot_members(&self, slot: Slot) -> &[PlayerId] {
        self.by_slot.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of tiers produced at a position.
    pub fn tier_count(&self, position: Position) -> u32 {
        self.by_slot
            .keys()
            .filter(|slot| slot.position == position)
            .map(|slot| slot.tier)
            .max()
            .unwrap_or(0)
    }

    pub fn qualified_count(&self) -> usize {
        self.assignments.len()
    }
}

// ---------------------------------------------------------------------------
// Tier assignment
// ---------------------------------------------------------------------------

/// Rank and tier every player at the given positions.
///
/// Players with fewer than `min_games` games are skipped entirely. Within a
/// position, players are sorted descending by `metric`; equal values fall
/// back to ascending player id so the ordering is deterministic.
pub fn assign_tiers(
    players: &[PlayerRecord],
    positions: &[Position],
    league_size: usize,
    min_games: usize,
    metric: TierMetric,
) -> SimResult<TierTable> {
    if league_size == 0 {
        return Err(SimError::settings("league_size", "must be greater than 0"));
    }

    let mut assignments = HashMap::new();
    let mut by_slot: BTreeMap<Slot, Vec<PlayerId>> = BTreeMap::new();

    for &position in positions {
        let mut ranked: Vec<&PlayerRecord> = players
            .iter()
            .filter(|p| p.position == position && p.games_played >= min_games)
            .collect();
        ranked.sort_by(|a, b| {
            metric
                .value(b)
                .partial_cmp(&metric.value(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        for (rank, player) in ranked.iter().enumerate() {
            let slot = Slot::new(position, (rank / league_size) as u32 + 1);
            assignments.insert(
                player.id,
                TierAssignment {
                    position_rank: rank + 1,
                    slot,
                },
            );
            by_slot.entry(slot).or_default().push(player.id);
        }

        debug!(
            position = %position,
            qualified = ranked.len(),
            tiers = ranked.len().div_ceil(league_size),
            "tiered position"
        );
    }

    Ok(TierTable {
        league_size,
        metric,
        assignments,
        by_slot,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_player(id: u32, position: Position, scores: &[f64]) -> PlayerRecord {
        PlayerRecord::new(PlayerId(id), format!("Player {id}"), position, scores.to_vec())
            .unwrap()
    }

    /// `count` receivers with strictly decreasing points per game.
    fn receivers(count: u32) -> Vec<PlayerRecord> {
        (1..=count)
            .map(|i| make_player(i, Position::WideReceiver, &[100.0 - i as f64]))
            .collect()
    }

    #[test]
    fn tier_count_is_ceil_n_over_l() {
        for (n, l) in [(10u32, 3usize), (9, 3), (1, 4), (12, 4), (13, 4)] {
            let players = receivers(n);
            let table =
                assign_tiers(&players, &[Position::WideReceiver], l, 0, TierMetric::default())
                    .unwrap();
            let tiers = table.tier_count(Position::WideReceiver);
            assert_eq!(tiers as usize, (n as usize).div_ceil(l), "n={n} l={l}");
            for tier in 1..tiers {
                let slot = Slot::new(Position::WideReceiver, tier);
                assert_eq!(table.slot_members(slot).len(), l);
            }
            let last = table.slot_members(Slot::new(Position::WideReceiver, tiers));
            assert!(!last.is_empty() && last.len() <= l);
        }
    }

    #[test]
    fn ranks_descend_by_metric() {
        let players = vec![
            make_player(1, Position::Quarterback, &[10.0]),
            make_player(2, Position::Quarterback, &[30.0]),
            make_player(3, Position::Quarterback, &[20.0]),
        ];
        let table =
            assign_tiers(&players, &[Position::Quarterback], 2, 0, TierMetric::PointsPerGame)
                .unwrap();

        let qb1 = Slot::new(Position::Quarterback, 1);
        let qb2 = Slot::new(Position::Quarterback, 2);
        assert_eq!(table.slot_members(qb1), &[PlayerId(2), PlayerId(3)]);
        assert_eq!(table.slot_members(qb2), &[PlayerId(1)]);
        assert_eq!(table.assignment(PlayerId(2)).unwrap().position_rank, 1);
        assert_eq!(table.assignment(PlayerId(1)).unwrap().position_rank, 3);
        assert_eq!(table.assignment(PlayerId(1)).unwrap().slot, qb2);
    }

    #[test]
    fn ties_break_by_player_id() {
        let players = vec![
            make_player(7, Position::TightEnd, &[8.0]),
            make_player(3, Position::TightEnd, &[8.0]),
            make_player(5, Position::TightEnd, &[8.0]),
        ];
        let table =
            assign_tiers(&players, &[Position::TightEnd], 3, 0, TierMetric::default()).unwrap();
        assert_eq!(
            table.slot_members(Slot::new(Position::TightEnd, 1)),
            &[PlayerId(3), PlayerId(5), PlayerId(7)]
        );
    }

    #[test]
    fn min_games_filter_excludes_players() {
        let players = vec![
            make_player(1, Position::RunningBack, &[30.0]),
            make_player(2, Position::RunningBack, &[10.0, 10.0, 10.0]),
        ];
        let table =
            assign_tiers(&players, &[Position::RunningBack], 2, 2, TierMetric::default()).unwrap();
        assert!(table.assignment(PlayerId(1)).is_none());
        assert_eq!(table.assignment(PlayerId(2)).unwrap().position_rank, 1);
        assert_eq!(table.qualified_count(), 1);
    }

    #[test]
    fn utility_metric_prefers_consistency() {
        // Same mean, different variance.
        let players = vec![
            make_player(1, Position::RunningBack, &[0.0, 0.0, 20.0, 20.0]),
            make_player(2, Position::RunningBack, &[10.0, 10.0, 10.0, 10.0]),
        ];
        let table =
            assign_tiers(&players, &[Position::RunningBack], 1, 0, TierMetric::Utility).unwrap();
        assert_eq!(table.assignment(PlayerId(2)).unwrap().position_rank, 1);
    }

    #[test]
    fn untiered_positions_are_ignored() {
        let players = vec![
            make_player(1, Position::Quarterback, &[20.0]),
            make_player(2, Position::Other, &[9.0]),
        ];
        let table =
            assign_tiers(&players, &[Position::Quarterback], 2, 0, TierMetric::default()).unwrap();
        assert!(table.assignment(PlayerId(2)).is_none());
        assert_eq!(table.tier_count(Position::Other), 0);
    }

    #[test]
    fn zero_league_size_rejected() {
        let players = receivers(3);
        assert!(assign_tiers(&players, &[Position::WideReceiver], 0, 0, TierMetric::default())
            .is_err());
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("ppg".parse::<TierMetric>().unwrap(), TierMetric::PointsPerGame);
        assert_eq!("Utility".parse::<TierMetric>().unwrap(), TierMetric::Utility);
        assert!("median".parse::<TierMetric>().is_err());
    }
}
