// Single-season simulation.
//
// Given the rosters dealt for one season, every rostered player's history is
// imputed out to a full season, one score per week is drawn from it, and the
// teams are ranked week by week. A team's win percentage is its average weekly
// rank scaled to [0, 1]; final standings rank the win percentages.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::ids::{PlayerId, SeasonId, TeamId};
use crate::imputer::impute_season;
use crate::league::LeagueSettings;
use crate::players::PlayerDb;
use crate::position::Slot;
use crate::roster::SeasonRoster;

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank each value among its peers: 0 for the lowest, `n - 1` for the highest.
///
/// Equal values keep their input order (the earlier index gets the lower
/// rank), so the result is always a permutation of `0..n`.
pub fn rank_scores(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0; values.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ranks[idx] = rank;
    }
    ranks
}

// ---------------------------------------------------------------------------
// Season records
// ---------------------------------------------------------------------------

/// One player's part in one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeason {
    pub player_id: PlayerId,
    pub season_id: SeasonId,
    pub team_id: TeamId,
    pub slot: Slot,
    pub weekly_scores: Vec<f64>,
    /// The team's final rank that season.
    pub season_rank: usize,
}

/// One team's season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeason {
    pub team_id: TeamId,
    pub season_id: SeasonId,
    pub roster: Vec<(Slot, PlayerId)>,
    pub weekly_scores: Vec<f64>,
    /// Sum of the rostered players' historical points per game.
    pub expected_weekly_points: f64,
    pub weekly_ranks: Vec<usize>,
    pub win_pct: f64,
    /// 0 is last place, `league_size - 1` is the champion.
    pub final_rank: usize,
}

impl TeamSeason {
    pub fn is_champion(&self, league_size: usize) -> bool {
        self.final_rank + 1 == league_size
    }
}

/// League-wide standings for one season. Per-team vectors follow `team_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub id: SeasonId,
    pub season_length: usize,
    pub team_ids: Vec<TeamId>,
    pub weekly_ranks: Vec<Vec<usize>>,
    pub win_pct: Vec<f64>,
    pub final_rank: Vec<usize>,
}

impl SeasonRecord {
    /// Every team's rank in one week (0-based), in `team_ids` order.
    pub fn week_ranks(&self, week: usize) -> Vec<usize> {
        self.weekly_ranks.iter().map(|ranks| ranks[week]).collect()
    }

    pub fn champion(&self) -> Option<TeamId> {
        let top = self.team_ids.len().checked_sub(1)?;
        self.final_rank
            .iter()
            .position(|&r| r == top)
            .map(|i| self.team_ids[i])
    }
}

/// Everything one simulated season produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonOutcome {
    pub record: SeasonRecord,
    pub teams: Vec<TeamSeason>,
    pub players: Vec<PlayerSeason>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Play one season over pre-dealt rosters.
pub fn simulate_season<R: Rng + ?Sized>(
    season_id: SeasonId,
    rosters: &[SeasonRoster],
    db: &PlayerDb,
    settings: &LeagueSettings,
    rng: &mut R,
) -> SimResult<SeasonOutcome> {
    let weeks = settings.season_length;
    let num_teams = rosters.len();

    // Per-player weekly draws, grouped by team in roster order.
    let mut drafted: Vec<Vec<(Slot, PlayerId, Vec<f64>)>> = Vec::with_capacity(num_teams);
    let mut expected: Vec<f64> = Vec::with_capacity(num_teams);
    for roster in rosters {
        let mut lineup = Vec::with_capacity(roster.entries.len());
        let mut projected = 0.0;
        for entry in &roster.entries {
            let player = db.get(entry.player_id).ok_or_else(|| {
                SimError::settings(
                    "roster",
                    format!("{} references unknown player {}", roster.team_id, entry.player_id),
                )
            })?;
            let season = impute_season(
                &player.historical_scores,
                weeks,
                settings.injury_policy,
                rng,
            )?;
            let draws: Vec<f64> = (0..weeks)
                .map(|_| season[rng.gen_range(0..season.len())])
                .collect();
            projected += player.points_per_game;
            lineup.push((entry.slot, entry.player_id, draws));
        }
        drafted.push(lineup);
        expected.push(projected);
    }

    let team_weekly: Vec<Vec<f64>> = drafted
        .iter()
        .map(|lineup| {
            (0..weeks)
                .map(|week| lineup.iter().map(|(_, _, draws)| draws[week]).sum())
                .collect()
        })
        .collect();

    let mut weekly_ranks: Vec<Vec<usize>> = vec![Vec::with_capacity(weeks); num_teams];
    for week in 0..weeks {
        let totals: Vec<f64> = team_weekly.iter().map(|scores| scores[week]).collect();
        for (team, rank) in rank_scores(&totals).into_iter().enumerate() {
            weekly_ranks[team].push(rank);
        }
    }

    let denominator = (num_teams.saturating_sub(1) * weeks) as f64;
    let win_pct: Vec<f64> = weekly_ranks
        .iter()
        .map(|ranks| {
            if denominator > 0.0 {
                ranks.iter().sum::<usize>() as f64 / denominator
            } else {
                0.0
            }
        })
        .collect();
    let final_rank = rank_scores(&win_pct);

    let mut teams = Vec::with_capacity(num_teams);
    let mut players = Vec::new();
    for (i, (roster, lineup)) in rosters.iter().zip(drafted).enumerate() {
        let mut roster_pairs = Vec::with_capacity(lineup.len());
        for (slot, player_id, weekly_scores) in lineup {
            roster_pairs.push((slot, player_id));
            players.push(PlayerSeason {
                player_id,
                season_id,
                team_id: roster.team_id,
                slot,
                weekly_scores,
                season_rank: final_rank[i],
            });
        }
        teams.push(TeamSeason {
            team_id: roster.team_id,
            season_id,
            roster: roster_pairs,
            weekly_scores: team_weekly[i].clone(),
            expected_weekly_points: expected[i],
            weekly_ranks: weekly_ranks[i].clone(),
            win_pct: win_pct[i],
            final_rank: final_rank[i],
        });
    }

    let record = SeasonRecord {
        id: season_id,
        season_length: weeks,
        team_ids: rosters.iter().map(|r| r.team_id).collect(),
        weekly_ranks,
        win_pct,
        final_rank,
    };
    debug!(season = %season_id, champion = ?record.champion(), "season simulated");

    Ok(SeasonOutcome {
        record,
        teams,
        players,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
