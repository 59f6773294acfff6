// League run container: settings, teams and the parallel trial runner.
//
// A `League` owns everything a run needs. `simulate` plays `num_seasons`
// independent trials across the rayon pool, each with its own ChaCha8 stream
// derived from the run's base seed, then reduces them into summaries.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{summarize_players, summarize_teams, PlayerSummary, TeamSummary};
use crate::error::{SimError, SimResult};
use crate::ids::{IdAllocator, PlayerId, SeasonId};
use crate::imputer::InjuryPolicy;
use crate::players::{PlayerDb, PlayerRecord};
use crate::position::{roster_positions, Position, Slot};
use crate::roster::{assign_rosters, create_teams, AssignmentMode, TeamRecord};
use crate::season::{simulate_season, SeasonOutcome};
use crate::tiering::TierMetric;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything that shapes a run besides the player data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueSettings {
    pub league_size: usize,
    /// Openings every team fills each season, in lineup order.
    pub roster_slots: Vec<Slot>,
    pub min_games_played: usize,
    pub season_length: usize,
    pub num_seasons: usize,
    pub injury_policy: InjuryPolicy,
    pub tier_metric: TierMetric,
    pub assignment_mode: AssignmentMode,
    /// Fixed base seed. `None` draws one from entropy and records it in the
    /// results.
    pub seed: Option<u64>,
    pub nicknames: Vec<String>,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        LeagueSettings {
            league_size: 10,
            roster_slots: vec![
                Slot::new(Position::Quarterback, 1),
                Slot::new(Position::RunningBack, 1),
                Slot::new(Position::RunningBack, 2),
                Slot::new(Position::WideReceiver, 1),
                Slot::new(Position::WideReceiver, 2),
                Slot::new(Position::WideReceiver, 3),
                Slot::new(Position::TightEnd, 1),
            ],
            min_games_played: 0,
            season_length: 16,
            num_seasons: 100,
            injury_policy: InjuryPolicy::default(),
            tier_metric: TierMetric::default(),
            assignment_mode: AssignmentMode::default(),
            seed: None,
            nicknames: Vec::new(),
        }
    }
}

impl LeagueSettings {
    pub fn validate(&self) -> SimResult<()> {
        if self.league_size < 2 {
            return Err(SimError::settings("league_size", "must be at least 2"));
        }
        if self.roster_slots.is_empty() {
            return Err(SimError::settings("roster_slots", "must name at least one slot"));
        }
        for (i, slot) in self.roster_slots.iter().enumerate() {
            if self.roster_slots[..i].contains(slot) {
                return Err(SimError::settings(
                    "roster_slots",
                    format!("slot `{slot}` is listed twice"),
                ));
            }
        }
        if self.season_length == 0 {
            return Err(SimError::settings("season_length", "must be at least 1"));
        }
        if self.num_seasons == 0 {
            return Err(SimError::settings("num_seasons", "must be at least 1"));
        }
        if u32::try_from(self.num_seasons).is_err() {
            return Err(SimError::settings("num_seasons", "too many seasons"));
        }
        Ok(())
    }

    pub fn positions(&self) -> Vec<Position> {
        roster_positions(&self.roster_slots)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Output of one `League::simulate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    /// Seed trial `i` was derived from (`base_seed + i`). Feeding it back in
    /// as `seed` replays the run.
    pub base_seed: u64,
    pub league_size: usize,
    /// Trial outcomes, in trial order.
    pub seasons: Vec<SeasonOutcome>,
    pub players: Vec<PlayerSummary>,
    pub teams: Vec<TeamSummary>,
}

impl SimulationResults {
    /// Summaries for one slot's tier, best champion rate first.
    pub fn slot_summaries(&self, slot: Slot) -> Vec<&PlayerSummary> {
        let mut rows: Vec<&PlayerSummary> = self
            .players
            .iter()
            .filter(|p| p.slot == Some(slot))
            .collect();
        rows.sort_by(|a, b| {
            b.champion_pct
                .unwrap_or(-1.0)
                .total_cmp(&a.champion_pct.unwrap_or(-1.0))
                .then_with(|| a.id.cmp(&b.id))
        });
        rows
    }
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

pub struct League {
    db: PlayerDb,
    settings: LeagueSettings,
    teams: Vec<TeamRecord>,
    ids: IdAllocator,
    results: Option<SimulationResults>,
}

impl League {
    /// Assemble a league from an aggregated player database.
    ///
    /// The database is tiered for this league's size, positions and metric
    /// (replacing any earlier tiering), and the slot pool is checked up
    /// front so an undersized pool fails here rather than inside a trial.
    pub fn new(
        mut db: PlayerDb,
        settings: LeagueSettings,
        mut ids: IdAllocator,
    ) -> SimResult<Self> {
        settings.validate()?;

        db.set_tiers(
            &settings.positions(),
            settings.league_size,
            settings.min_games_played,
            settings.tier_metric,
        )?;

        check_pool(&db, &settings)?;

        let teams = create_teams(settings.league_size, &settings.nicknames, &mut ids);
        info!(
            "League ready: {} teams, roster [{}], {} players in the slot pool",
            teams.len(),
            settings
                .roster_slots
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            db.player_pool(&settings.roster_slots)?.len()
        );

        Ok(League {
            db,
            settings,
            teams,
            ids,
            results: None,
        })
    }

    pub fn settings(&self) -> &LeagueSettings {
        &self.settings
    }

    pub fn db(&self) -> &PlayerDb {
        &self.db
    }

    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.db.get(id)
    }

    pub fn position_players(&self, position: Position) -> Vec<&PlayerRecord> {
        self.db.position_players(position)
    }

    /// A season from the most recent run, if any.
    pub fn season(&self, id: SeasonId) -> Option<&SeasonOutcome> {
        self.results
            .as_ref()?
            .seasons
            .iter()
            .find(|s| s.record.id == id)
    }

    pub fn results(&self) -> SimResult<&SimulationResults> {
        self.results.as_ref().ok_or_else(|| SimError::NotReady {
            what: "simulation results".into(),
        })
    }

    /// Play every trial and reduce the outcomes.
    ///
    /// The first failing trial aborts the run and its error is returned.
    /// Calling this again plays a fresh set of seasons with new season ids.
    pub fn simulate(&mut self) -> SimResult<&SimulationResults> {
        let base_seed = self.settings.seed.unwrap_or_else(rand::random);
        let trials = u32::try_from(self.settings.num_seasons)
            .map_err(|_| SimError::settings("num_seasons", "too many seasons"))?;
        let first = self.ids.reserve_seasons(trials);

        info!(
            "Simulating {} seasons of {} weeks (seed {base_seed}, policy {}, mode {})",
            trials,
            self.settings.season_length,
            self.settings.injury_policy,
            self.settings.assignment_mode
        );

        let seasons = {
            let league = &*self;
            (0..trials)
                .into_par_iter()
                .map(|trial| league.run_trial(trial, base_seed, first))
                .collect::<SimResult<Vec<_>>>()?
        };

        let league_size = self.settings.league_size;
        let players =
            summarize_players(&self.db, &self.settings.roster_slots, &seasons, league_size)?;
        let teams = summarize_teams(&self.teams, &seasons, league_size);
        info!(
            "Simulation complete: {} seasons, {} players summarized",
            seasons.len(),
            players.len()
        );

        Ok(self.results.insert(SimulationResults {
            base_seed,
            league_size,
            seasons,
            players,
            teams,
        }))
    }

    fn run_trial(&self, trial: u32, base_seed: u64, first: SeasonId) -> SimResult<SeasonOutcome> {
        let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(u64::from(trial)));
        let season_id = SeasonId(first.0 + trial);
        debug!(trial, season = %season_id, "starting trial");

        let rosters = assign_rosters(
            &self.db,
            &self.settings.roster_slots,
            &self.teams,
            self.settings.assignment_mode,
            &mut rng,
        )?;
        simulate_season(season_id, &rosters, &self.db, &self.settings, &mut rng)
    }
}

/// Fail early if any position (or tier, when dealing by tier) cannot fill
/// its openings for every team.
fn check_pool(db: &PlayerDb, settings: &LeagueSettings) -> SimResult<()> {
    let league_size = settings.league_size;
    match settings.assignment_mode {
        AssignmentMode::PositionGroup => {
            for position in settings.positions() {
                let openings = settings
                    .roster_slots
                    .iter()
                    .filter(|s| s.position == position)
                    .count();
                let available = db.eligible_at(position, &settings.roster_slots)?.len();
                let needed = league_size * openings;
                if available < needed {
                    return Err(SimError::InsufficientPlayerPool {
                        position,
                        needed,
                        available,
                    });
                }
            }
        }
        AssignmentMode::ByTier => {
            for &slot in &settings.roster_slots {
                let available = db.slot_players(slot)?.len();
                if available < league_size {
                    return Err(SimError::InsufficientPlayerPool {
                        position: slot.position,
                        needed: league_size,
                        available,
                    });
                }
            }
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

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn qb_db(ids: &mut IdAllocator, histories: &[&[f64]]) -> PlayerDb {
        PlayerDb::new(
            histories
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let name = format!("QB {i}");
                    PlayerRecord::new(ids.next_player(), name, Position::Quarterback, h.to_vec())
                        .unwrap()
                })
                .collect(),
        )
    }

    fn qb_settings(league_size: usize) -> LeagueSettings {
        LeagueSettings {
            league_size,
            roster_slots: vec![Slot::new(Position::Quarterback, 1)],
            season_length: 3,
            num_seasons: 10,
            seed: Some(1234),
            ..LeagueSettings::default()
        }
    }

    fn three_qb_league() -> League {
        let mut ids = IdAllocator::new();
        let db = qb_db(&mut ids, &[&[25.0, 18.0, 30.0], &[12.0, 14.0, 9.0], &[20.0, 2.0, 22.0]]);
        League::new(db, qb_settings(3), ids).unwrap()
    }

    #[test]
    fn champion_pct_sums_to_one() {
        let mut league = three_qb_league();
        let results = league.simulate().unwrap();
        assert_eq!(results.seasons.len(), 10);
        assert_eq!(results.players.len(), 3);

        let total: f64 = results
            .players
            .iter()
            .map(|p| p.champion_pct.unwrap())
            .sum();
        assert!(approx_eq(total, 1.0));
        assert!(results.players.iter().all(|p| p.seasons_rostered == 10));

        let titles: usize = results.teams.iter().map(|t| t.championships).sum();
        assert_eq!(titles, 10);
    }

    #[test]
    fn same_seed_same_results() {
        let a = three_qb_league().simulate().unwrap().clone();
        let b = three_qb_league().simulate().unwrap().clone();
        assert_eq!(a, b);
        assert_eq!(a.base_seed, 1234);
    }

    #[test]
    fn season_ids_are_unique_and_queryable() {
        let mut league = three_qb_league();
        league.simulate().unwrap();
        let first = league.results().unwrap().seasons[0].record.id;
        assert!(league.season(first).is_some());

        league.simulate().unwrap();
        let second = league.results().unwrap().seasons[0].record.id;
        assert!(second > first);
        assert!(league.season(first).is_none());
    }

    #[test]
    fn results_before_simulate_are_not_ready() {
        let league = three_qb_league();
        assert!(matches!(league.results(), Err(SimError::NotReady { .. })));
    }

    #[test]
    fn undersized_pool_fails_at_construction() {
        let mut ids = IdAllocator::new();
        let db = qb_db(&mut ids, &[&[10.0], &[12.0]]);
        let err = League::new(db, qb_settings(3), ids).err().unwrap();
        assert_eq!(
            err,
            SimError::InsufficientPlayerPool {
                position: Position::Quarterback,
                needed: 3,
                available: 2
            }
        );
    }

    #[test]
    fn settings_validation() {
        let mut settings = LeagueSettings::default();
        assert!(settings.validate().is_ok());

        settings.league_size = 1;
        assert!(settings.validate().is_err());

        let mut settings = LeagueSettings::default();
        settings.roster_slots.push(Slot::new(Position::TightEnd, 1));
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("te1"));

        let settings = LeagueSettings {
            season_length: 0,
            ..LeagueSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn nicknames_label_teams() {
        let mut ids = IdAllocator::new();
        let db = qb_db(&mut ids, &[&[1.0], &[2.0]]);
        let settings = LeagueSettings {
            nicknames: vec!["Bills".into()],
            ..qb_settings(2)
        };
        let league = League::new(db, settings, ids).unwrap();
        assert_eq!(league.teams()[0].nickname, "Bills");
        assert_eq!(league.teams()[1].nickname, "Team 2");
        // Team ids run on their own sequence.
        assert_eq!(league.teams()[0].id.0, 1);
    }
}
