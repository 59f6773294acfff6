// Per-season roster assignment.
//
// Every simulated season deals the slot pool out to the teams afresh. The
// deal only depends on the season's own RNG, so seasons are independent of
// one another and can be generated in any order.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::ids::{IdAllocator, PlayerId, TeamId};
use crate::players::PlayerDb;
use crate::position::{roster_positions, Slot};

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// A franchise that persists across every simulated season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub nickname: String,
}

/// Create `league_size` teams. Nicknames are taken in order; teams past the
/// end of the list are named "Team N".
pub fn create_teams(
    league_size: usize,
    nicknames: &[String],
    ids: &mut IdAllocator,
) -> Vec<TeamRecord> {
    (0..league_size)
        .map(|i| TeamRecord {
            id: ids.next_team(),
            nickname: nicknames
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Team {}", i + 1)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assignment mode
// ---------------------------------------------------------------------------

/// How the slot pool is dealt to teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Shuffle every eligible player at a position together and deal each
    /// team as many as it has openings there. A team may land two players
    /// from the same tier.
    #[default]
    PositionGroup,
    /// Shuffle each slot's tier on its own and deal one player per team, so
    /// every team gets exactly one player from every configured tier.
    ByTier,
}

impl AssignmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentMode::PositionGroup => "position_group",
            AssignmentMode::ByTier => "by_tier",
        }
    }
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "position_group" => Ok(AssignmentMode::PositionGroup),
            "by_tier" => Ok(AssignmentMode::ByTier),
            other => Err(SimError::settings(
                "assignment_mode",
                format!("unknown mode `{other}`"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Season rosters
// ---------------------------------------------------------------------------

/// One filled roster opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The opening this player fills.
    pub slot: Slot,
    pub player_id: PlayerId,
}

/// A team's lineup for one season, one entry per roster slot in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRoster {
    pub team_id: TeamId,
    pub entries: Vec<RosterEntry>,
}

impl SeasonRoster {
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entries.iter().map(|e| e.player_id)
    }
}

/// Deal the slot pool to `teams` for one season.
///
/// Returns one `SeasonRoster` per team, in `teams` order. Fails with
/// `InsufficientPlayerPool` if any position (or, in `ByTier` mode, any tier)
/// has fewer eligible players than openings to fill, and with `NotReady` if
/// the database has not been tiered.
pub fn assign_rosters<R: Rng + ?Sized>(
    db: &PlayerDb,
    roster_slots: &[Slot],
    teams: &[TeamRecord],
    mode: AssignmentMode,
    rng: &mut R,
) -> SimResult<Vec<SeasonRoster>> {
    let mut rosters: Vec<SeasonRoster> = teams
        .iter()
        .map(|t| SeasonRoster {
            team_id: t.id,
            entries: Vec::with_capacity(roster_slots.len()),
        })
        .collect();

    match mode {
        AssignmentMode::PositionGroup => deal_by_position(db, roster_slots, &mut rosters, rng)?,
        AssignmentMode::ByTier => deal_by_tier(db, roster_slots, &mut rosters, rng)?,
    }

    // Dealing walks positions; present entries in roster order instead.
    let slot_order = |slot: &Slot| roster_slots.iter().position(|s| s == slot);
    for roster in &mut rosters {
        roster.entries.sort_by_key(|e| slot_order(&e.slot));
    }
    Ok(rosters)
}

fn deal_by_position<R: Rng + ?Sized>(
    db: &PlayerDb,
    roster_slots: &[Slot],
    rosters: &mut [SeasonRoster],
    rng: &mut R,
) -> SimResult<()> {
    for position in roster_positions(roster_slots) {
        let openings: Vec<Slot> = roster_slots
            .iter()
            .copied()
            .filter(|s| s.position == position)
            .collect();
        let mut pool: Vec<PlayerId> = db
            .eligible_at(position, roster_slots)?
            .iter()
            .map(|p| p.id)
            .collect();

        let needed = rosters.len() * openings.len();
        if pool.len() < needed {
            return Err(SimError::InsufficientPlayerPool {
                position,
                needed,
                available: pool.len(),
            });
        }

        pool.shuffle(rng);

        // Each team index repeats once per opening, back to back:
        // t0 t0 t1 t1 ... for two openings.
        let seats = (0..rosters.len())
            .flat_map(|team| openings.iter().map(move |slot| (team, *slot)));
        for ((team, slot), player_id) in seats.zip(pool) {
            rosters[team].entries.push(RosterEntry { slot, player_id });
        }
    }
    Ok(())
}

fn deal_by_tier<R: Rng + ?Sized>(
    db: &PlayerDb,
    roster_slots: &[Slot],
    rosters: &mut [SeasonRoster],
    rng: &mut R,
) -> SimResult<()> {
    let tiers = db.tiers()?;
    for &slot in roster_slots {
        let mut tier: Vec<PlayerId> = tiers.slot_members(slot).to_vec();
        if tier.len() < rosters.len() {
            return Err(SimError::InsufficientPlayerPool {
                position: slot.position,
                needed: rosters.len(),
                available: tier.len(),
            });
        }
        tier.shuffle(rng);
        for (roster, player_id) in rosters.iter_mut().zip(tier) {
            roster.entries.push(RosterEntry { slot, player_id });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::PlayerRecord;
    use crate::position::Position;
    use crate::tiering::TierMetric;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn slots(labels: &[&str]) -> Vec<Slot> {
        labels.iter().map(|l| l.parse().unwrap()).collect()
    }

    /// `per_position` players at each of qb/rb/wr/te with distinct scores.
    fn tiered_db(per_position: u32, league_size: usize) -> PlayerDb {
        let mut ids = IdAllocator::new();
        let mut players = Vec::new();
        for position in [
            Position::Quarterback,
            Position::RunningBack,
            Position::WideReceiver,
            Position::TightEnd,
        ] {
            for i in 0..per_position {
                players.push(
                    PlayerRecord::new(
                        ids.next_player(),
                        format!("{position} {i}"),
                        position,
                        vec![40.0 - i as f64, 20.0],
                    )
                    .unwrap(),
                );
            }
        }
        let mut db = PlayerDb::new(players);
        db.set_tiers(
            &[
                Position::Quarterback,
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            league_size,
            0,
            TierMetric::default(),
        )
        .unwrap();
        db
    }

    fn teams(n: usize) -> Vec<TeamRecord> {
        create_teams(n, &[], &mut IdAllocator::new())
    }

    fn assert_valid_rosters(rosters: &[SeasonRoster], roster_slots: &[Slot]) {
        let mut seen = HashSet::new();
        for roster in rosters {
            assert_eq!(roster.entries.len(), roster_slots.len());
            let on_team: HashSet<PlayerId> = roster.player_ids().collect();
            assert_eq!(on_team.len(), roster_slots.len(), "duplicate on {}", roster.team_id);
            for id in on_team {
                assert!(seen.insert(id), "{id} assigned twice");
            }
            let entry_slots: Vec<Slot> = roster.entries.iter().map(|e| e.slot).collect();
            assert_eq!(entry_slots, roster_slots);
        }
    }

    #[test]
    fn position_group_deal_fills_every_opening() {
        let roster_slots = slots(&["qb1", "rb1", "rb2", "wr1", "wr2", "wr3", "te1"]);
        let db = tiered_db(40, 10);
        let teams = teams(10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let rosters =
                assign_rosters(&db, &roster_slots, &teams, AssignmentMode::PositionGroup, &mut rng)
                    .unwrap();
            assert_eq!(rosters.len(), 10);
            assert_valid_rosters(&rosters, &roster_slots);
        }
    }

    #[test]
    fn position_group_deal_uses_only_configured_tiers() {
        let roster_slots = slots(&["rb1", "rb2"]);
        let db = tiered_db(12, 4);
        let teams = teams(4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let rosters =
            assign_rosters(&db, &roster_slots, &teams, AssignmentMode::PositionGroup, &mut rng)
                .unwrap();
        let tiers = db.tiers().unwrap();
        for id in rosters.iter().flat_map(|r| r.player_ids()) {
            assert!(tiers.assignment(id).unwrap().slot.tier <= 2);
        }
    }

    #[test]
    fn by_tier_deal_gives_one_player_per_tier() {
        let roster_slots = slots(&["qb1", "rb1", "rb2", "wr1", "te1"]);
        let db = tiered_db(20, 5);
        let teams = teams(5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let rosters =
            assign_rosters(&db, &roster_slots, &teams, AssignmentMode::ByTier, &mut rng).unwrap();
        assert_valid_rosters(&rosters, &roster_slots);

        let tiers = db.tiers().unwrap();
        for roster in &rosters {
            for entry in &roster.entries {
                assert_eq!(tiers.assignment(entry.player_id).unwrap().slot, entry.slot);
            }
        }
    }

    #[test]
    fn short_pool_is_insufficient() {
        // 7 receivers, 3 teams, 3 WR openings -> need 9.
        let roster_slots = slots(&["wr1", "wr2", "wr3"]);
        let db = tiered_db(7, 3);
        let teams = teams(3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for mode in [AssignmentMode::PositionGroup, AssignmentMode::ByTier] {
            let err = assign_rosters(&db, &roster_slots, &teams, mode, &mut rng).unwrap_err();
            match err {
                SimError::InsufficientPlayerPool { position, .. } => {
                    assert_eq!(position, Position::WideReceiver)
                }
                other => panic!("expected InsufficientPlayerPool, got: {other}"),
            }
        }
    }

    #[test]
    fn untiered_db_is_not_ready() {
        let db = PlayerDb::new(vec![]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = assign_rosters(&db, &slots(&["qb1"]), &teams(2), AssignmentMode::ByTier, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SimError::NotReady { .. }));
    }

    #[test]
    fn deals_vary_between_seasons() {
        let roster_slots = slots(&["qb1"]);
        let db = tiered_db(6, 6);
        let teams = teams(6);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let first =
            assign_rosters(&db, &roster_slots, &teams, AssignmentMode::PositionGroup, &mut rng)
                .unwrap();
        let differs = (0..10).any(|_| {
            assign_rosters(&db, &roster_slots, &teams, AssignmentMode::PositionGroup, &mut rng)
                .unwrap()
                != first
        });
        assert!(differs);
    }

    #[test]
    fn team_nicknames_fall_back_to_numbers() {
        let nicknames = vec!["Raiders".to_string(), "Colts".to_string()];
        let teams = create_teams(3, &nicknames, &mut IdAllocator::new());
        assert_eq!(teams[0].nickname, "Raiders");
        assert_eq!(teams[2].nickname, "Team 3");
        assert_eq!(teams[2].id, TeamId(3));
    }
}
