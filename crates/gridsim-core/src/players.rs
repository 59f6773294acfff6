// Player aggregation and the player database.
//
// Weekly game-log rows are scored and grouped by (name, position) into one
// immutable `PlayerRecord` per player. The `PlayerDb` owns those records and,
// once `set_tiers` has run, the tier table used to build the slot pool.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::certainty::ScoringProfile;
use crate::error::{SimError, SimResult};
use crate::ids::{IdAllocator, PlayerId};
use crate::position::{Position, Slot};
use crate::scoring::{CategoryCounts, ScoringWeights};
use crate::tiering::{self, TierAssignment, TierMetric, TierTable};

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One player's stat line for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGameLog {
    pub player: String,
    pub position: Position,
    pub week: u32,
    pub counts: CategoryCounts,
}

// ---------------------------------------------------------------------------
// Player record
// ---------------------------------------------------------------------------

/// A player's historical scoring and the statistics derived from it.
///
/// Read-only once built. Per-season outcomes live in the trial records
/// (`PlayerSeason`), never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    /// Fantasy points per game, in game-log order.
    pub historical_scores: Vec<f64>,
    pub games_played: usize,
    pub points_per_game: f64,
    pub utility: f64,
    pub consistency: f64,
}

impl PlayerRecord {
    /// Build a record, computing the derived statistics up front.
    ///
    /// Fails with `InvalidScore` if `scores` is empty or holds a value below -1.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        position: Position,
        scores: Vec<f64>,
    ) -> SimResult<Self> {
        let name = name.into();
        let profile = ScoringProfile::from_scores(&scores).map_err(|e| match e {
            SimError::InvalidScore { message } => {
                SimError::invalid_score(format!("{name} ({position}): {message}"))
            }
            other => other,
        })?;
        Ok(PlayerRecord {
            id,
            name,
            position,
            games_played: scores.len(),
            historical_scores: scores,
            points_per_game: profile.points_per_game,
            utility: profile.utility,
            consistency: profile.consistency,
        })
    }
}

// ---------------------------------------------------------------------------
// Player database
// ---------------------------------------------------------------------------

/// Every player in a run, plus the tier table once tiering has run.
#[derive(Debug, Clone)]
pub struct PlayerDb {
    /// Sorted by id.
    players: Vec<PlayerRecord>,
    tiers: Option<TierTable>,
}

impl PlayerDb {
    pub fn new(mut players: Vec<PlayerRecord>) -> Self {
        players.sort_by_key(|p| p.id);
        PlayerDb {
            players,
            tiers: None,
        }
    }

    /// Score every row and group the results by (player, position).
    ///
    /// Records are created in order of each key's first appearance, so ids
    /// are stable for a given input. The same name at two positions becomes
    /// two separate players.
    pub fn from_game_logs(
        logs: &[RawGameLog],
        weights: &ScoringWeights,
        ids: &mut IdAllocator,
    ) -> SimResult<Self> {
        let mut index: HashMap<(&str, Position), usize> = HashMap::new();
        let mut grouped: Vec<(&str, Position, Vec<f64>)> = Vec::new();

        for row in logs {
            let points = weights.score(&row.counts).map_err(|e| match e {
                SimError::SchemaMismatch { message } => SimError::schema(format!(
                    "{} week {}: {message}",
                    row.player, row.week
                )),
                other => other,
            })?;
            let key = (row.player.as_str(), row.position);
            let idx = *index.entry(key).or_insert_with(|| {
                grouped.push((key.0, key.1, Vec::new()));
                grouped.len() - 1
            });
            grouped[idx].2.push(points);
        }

        let players = grouped
            .into_iter()
            .map(|(name, position, scores)| {
                PlayerRecord::new(ids.next_player(), name, position, scores)
            })
            .collect::<SimResult<Vec<_>>>()?;

        info!(
            "Aggregated {} game-log rows into {} players",
            logs.len(),
            players.len()
        );
        Ok(PlayerDb::new(players))
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.players[i])
    }

    /// All players at a position, in id order.
    pub fn position_players(&self, position: Position) -> Vec<&PlayerRecord> {
        self.players
            .iter()
            .filter(|p| p.position == position)
            .collect()
    }

    /// Rank and tier the given positions. Replaces any earlier tiering.
    pub fn set_tiers(
        &mut self,
        positions: &[Position],
        league_size: usize,
        min_games: usize,
        metric: TierMetric,
    ) -> SimResult<()> {
        let table =
            tiering::assign_tiers(&self.players, positions, league_size, min_games, metric)?;
        info!(
            "Tiered {} qualified players across {} positions by {}",
            table.qualified_count(),
            positions.len(),
            metric
        );
        self.tiers = Some(table);
        Ok(())
    }

    pub fn is_tiered(&self) -> bool {
        self.tiers.is_some()
    }

    pub fn tiers(&self) -> SimResult<&TierTable> {
        self.tiers.as_ref().ok_or_else(|| SimError::NotReady {
            what: "tier table".into(),
        })
    }

    /// A player's rank and slot; `Ok(None)` if the player did not qualify.
    pub fn tier_of(&self, id: PlayerId) -> SimResult<Option<&TierAssignment>> {
        Ok(self.tiers()?.assignment(id))
    }

    /// Players in one slot's tier, best first.
    pub fn slot_players(&self, slot: Slot) -> SimResult<Vec<&PlayerRecord>> {
        let tiers = self.tiers()?;
        Ok(tiers
            .slot_members(slot)
            .iter()
            .filter_map(|id| self.get(*id))
            .collect())
    }

    /// Every player whose tier is one of `roster_slots`, grouped by slot in
    /// roster order.
    pub fn player_pool(&self, roster_slots: &[Slot]) -> SimResult<Vec<&PlayerRecord>> {
        let mut pool = Vec::new();
        for (i, slot) in roster_slots.iter().enumerate() {
            if roster_slots[..i].contains(slot) {
                continue;
            }
            pool.extend(self.slot_players(*slot)?);
        }
        Ok(pool)
    }

    /// The slot pool restricted to one position.
    pub fn eligible_at(
        &self,
        position: Position,
        roster_slots: &[Slot],
    ) -> SimResult<Vec<&PlayerRecord>> {
        let slots: Vec<Slot> = roster_slots
            .iter()
            .copied()
            .filter(|s| s.position == position)
            .collect();
        self.player_pool(&slots)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> ScoringWeights {
        ScoringWeights::new(vec![("yards".into(), 0.1), ("tds".into(), 6.0)]).unwrap()
    }

    fn row(player: &str, position: Position, week: u32, yards: f64, tds: f64) -> RawGameLog {
        RawGameLog {
            player: player.into(),
            position,
            week,
            counts: [("yards".to_string(), yards), ("tds".to_string(), tds)]
                .into_iter()
                .collect(),
        }
    }

    fn sample_logs() -> Vec<RawGameLog> {
        vec![
            row("Drew Brees", Position::Quarterback, 1, 300.0, 2.0),
            row("Arian Foster", Position::RunningBack, 1, 100.0, 1.0),
            row("Drew Brees", Position::Quarterback, 2, 250.0, 1.0),
            row("Arian Foster", Position::RunningBack, 2, 50.0, 0.0),
            row("Drew Brees", Position::Quarterback, 3, 200.0, 3.0),
        ]
    }

    #[test]
    fn groups_rows_by_player_in_log_order() {
        let mut ids = IdAllocator::new();
        let db = PlayerDb::from_game_logs(&sample_logs(), &weights(), &mut ids).unwrap();
        assert_eq!(db.len(), 2);

        let brees = &db.players()[0];
        assert_eq!(brees.id, PlayerId(1));
        assert_eq!(brees.name, "Drew Brees");
        assert_eq!(brees.games_played, 3);
        assert_eq!(brees.historical_scores, vec![42.0, 31.0, 38.0]);
        assert!((brees.points_per_game - 37.0).abs() < 1e-9);

        let foster = db.get(PlayerId(2)).unwrap();
        assert_eq!(foster.historical_scores, vec![16.0, 5.0]);
    }

    #[test]
    fn name_collision_across_positions_creates_two_players() {
        let logs = vec![
            row("Ty Montgomery", Position::WideReceiver, 1, 40.0, 0.0),
            row("Ty Montgomery", Position::RunningBack, 2, 60.0, 1.0),
        ];
        let mut ids = IdAllocator::new();
        let db = PlayerDb::from_game_logs(&logs, &weights(), &mut ids).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.position_players(Position::RunningBack).len(), 1);
    }

    #[test]
    fn schema_mismatch_names_the_row() {
        let mut logs = sample_logs();
        logs[3].counts.remove("tds");
        let mut ids = IdAllocator::new();
        let err = PlayerDb::from_game_logs(&logs, &weights(), &mut ids).unwrap_err();
        assert!(matches!(err, SimError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("Arian Foster week 2"));
    }

    #[test]
    fn score_below_minus_one_is_invalid() {
        let weights = ScoringWeights::new(vec![("ints".into(), -2.0)]).unwrap();
        let logs = vec![RawGameLog {
            player: "Turnover Machine".into(),
            position: Position::Quarterback,
            week: 1,
            counts: [("ints".to_string(), 2.0)].into_iter().collect(),
        }];
        let mut ids = IdAllocator::new();
        let err = PlayerDb::from_game_logs(&logs, &weights, &mut ids).unwrap_err();
        assert!(matches!(err, SimError::InvalidScore { .. }));
    }

    #[test]
    fn slot_queries_before_tiering_are_not_ready() {
        let mut ids = IdAllocator::new();
        let db = PlayerDb::from_game_logs(&sample_logs(), &weights(), &mut ids).unwrap();
        let qb1 = Slot::new(Position::Quarterback, 1);
        assert!(matches!(db.slot_players(qb1), Err(SimError::NotReady { .. })));
        assert!(matches!(db.player_pool(&[qb1]), Err(SimError::NotReady { .. })));
        assert!(matches!(db.tier_of(PlayerId(1)), Err(SimError::NotReady { .. })));
    }

    #[test]
    fn player_pool_covers_configured_slots_only() {
        let players: Vec<PlayerRecord> = (1..=7)
            .map(|i| {
                PlayerRecord::new(
                    PlayerId(i),
                    format!("RB {i}"),
                    Position::RunningBack,
                    vec![50.0 - i as f64],
                )
                .unwrap()
            })
            .collect();
        let mut db = PlayerDb::new(players);
        db.set_tiers(&[Position::RunningBack], 3, 0, TierMetric::default())
            .unwrap();

        let rb1 = Slot::new(Position::RunningBack, 1);
        let rb2 = Slot::new(Position::RunningBack, 2);
        let pool = db.player_pool(&[rb1, rb2]).unwrap();
        assert_eq!(pool.len(), 6);
        // RB 7 sits in tier 3, outside the configured slots.
        assert!(pool.iter().all(|p| p.id != PlayerId(7)));
        assert_eq!(
            db.tier_of(PlayerId(7)).unwrap().unwrap().slot,
            Slot::new(Position::RunningBack, 3)
        );
        assert_eq!(db.eligible_at(Position::RunningBack, &[rb1]).unwrap().len(), 3);
    }
}
