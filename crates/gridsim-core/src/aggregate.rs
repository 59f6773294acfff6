// Cross-season reduction.
//
// Each season outcome is folded into per-player and per-team tallies. Tallies
// merge associatively, so seasons can be combined in any grouping; they are
// folded in trial order so float sums are reproducible for a given seed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::ids::{PlayerId, TeamId};
use crate::players::PlayerDb;
use crate::position::{Position, Slot};
use crate::roster::TeamRecord;
use crate::season::{PlayerSeason, SeasonOutcome, TeamSeason};
use crate::stats;

// ---------------------------------------------------------------------------
// Player tallies
// ---------------------------------------------------------------------------

/// Running totals for one player across the seasons it was rostered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTally {
    /// `league_size - season_rank` per season: 1.0 for a title, `league_size`
    /// for last place.
    finishes: Vec<f64>,
    championships: usize,
    points: f64,
    weeks: usize,
}

impl PlayerTally {
    pub fn record(&mut self, season: &PlayerSeason, league_size: usize) {
        let finish = league_size.saturating_sub(season.season_rank);
        self.finishes.push(finish as f64);
        if finish == 1 {
            self.championships += 1;
        }
        self.points += season.weekly_scores.iter().sum::<f64>();
        self.weeks += season.weekly_scores.len();
    }

    /// Combine two tallies. `a.merge(b).merge(c) == a.merge(b.merge(c))`.
    pub fn merge(mut self, other: PlayerTally) -> PlayerTally {
        self.finishes.extend(other.finishes);
        self.championships += other.championships;
        self.points += other.points;
        self.weeks += other.weeks;
        self
    }

    pub fn seasons(&self) -> usize {
        self.finishes.len()
    }

    pub fn average_team_ranking(&self) -> Option<f64> {
        stats::mean(&self.finishes)
    }

    pub fn harmonic_team_ranking(&self) -> Option<f64> {
        stats::harmonic_mean(&self.finishes)
    }

    pub fn champion_pct(&self) -> Option<f64> {
        if self.finishes.is_empty() {
            return None;
        }
        Some(self.championships as f64 / self.finishes.len() as f64)
    }

    pub fn mean_weekly_score(&self) -> Option<f64> {
        if self.weeks == 0 {
            return None;
        }
        Some(self.points / self.weeks as f64)
    }
}

/// Per-player simulation summary. Ranking fields are `None` for players in
/// the slot pool who were never rostered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub slot: Option<Slot>,
    pub position_rank: Option<usize>,
    pub points_per_game: f64,
    pub utility: f64,
    pub consistency: f64,
    pub seasons_rostered: usize,
    pub average_team_ranking: Option<f64>,
    pub harmonic_team_ranking: Option<f64>,
    pub champion_pct: Option<f64>,
    pub mean_weekly_score: Option<f64>,
}

fn tally_players(
    outcome: &SeasonOutcome,
    league_size: usize,
) -> HashMap<PlayerId, PlayerTally> {
    let mut tallies: HashMap<PlayerId, PlayerTally> = HashMap::new();
    for season in &outcome.players {
        tallies
            .entry(season.player_id)
            .or_default()
            .record(season, league_size);
    }
    tallies
}

fn merge_maps<K, V, F>(mut into: HashMap<K, V>, from: HashMap<K, V>, merge: F) -> HashMap<K, V>
where
    K: std::hash::Hash + Eq,
    V: Default,
    F: Fn(V, V) -> V,
{
    for (key, value) in from {
        let current = into.remove(&key).unwrap_or_default();
        into.insert(key, merge(current, value));
    }
    into
}

/// Summarize every player in the slot pool, in pool order.
pub fn summarize_players(
    db: &PlayerDb,
    roster_slots: &[Slot],
    outcomes: &[SeasonOutcome],
    league_size: usize,
) -> SimResult<Vec<PlayerSummary>> {
    let tallies = outcomes
        .iter()
        .map(|outcome| tally_players(outcome, league_size))
        .fold(HashMap::new(), |acc, next| merge_maps(acc, next, PlayerTally::merge));

    let empty = PlayerTally::default();
    let mut summaries = Vec::new();
    for player in db.player_pool(roster_slots)? {
        let tier = db.tier_of(player.id)?;
        let tally = tallies.get(&player.id).unwrap_or(&empty);
        summaries.push(PlayerSummary {
            id: player.id,
            name: player.name.clone(),
            position: player.position,
            slot: tier.map(|t| t.slot),
            position_rank: tier.map(|t| t.position_rank),
            points_per_game: player.points_per_game,
            utility: player.utility,
            consistency: player.consistency,
            seasons_rostered: tally.seasons(),
            average_team_ranking: tally.average_team_ranking(),
            harmonic_team_ranking: tally.harmonic_team_ranking(),
            champion_pct: tally.champion_pct(),
            mean_weekly_score: tally.mean_weekly_score(),
        });
    }
    Ok(summaries)
}

// ---------------------------------------------------------------------------
// Team tallies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamTally {
    seasons: usize,
    rank_sum: usize,
    win_pct_sum: f64,
    points: f64,
    weeks: usize,
    expected_sum: f64,
    championships: usize,
}

impl TeamTally {
    pub fn record(&mut self, season: &TeamSeason, league_size: usize) {
        self.seasons += 1;
        self.rank_sum += season.final_rank;
        self.win_pct_sum += season.win_pct;
        self.points += season.weekly_scores.iter().sum::<f64>();
        self.weeks += season.weekly_scores.len();
        self.expected_sum += season.expected_weekly_points;
        if season.is_champion(league_size) {
            self.championships += 1;
        }
    }

    pub fn merge(mut self, other: TeamTally) -> TeamTally {
        self.seasons += other.seasons;
        self.rank_sum += other.rank_sum;
        self.win_pct_sum += other.win_pct_sum;
        self.points += other.points;
        self.weeks += other.weeks;
        self.expected_sum += other.expected_sum;
        self.championships += other.championships;
        self
    }
}

/// Per-team aggregates over all seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: TeamId,
    pub nickname: String,
    pub seasons: usize,
    /// Mean final rank (0 = last, `league_size - 1` = champion).
    pub mean_final_rank: f64,
    pub mean_win_pct: f64,
    pub mean_weekly_points: f64,
    /// Mean over seasons of the roster's summed historical points per game.
    pub mean_expected_weekly_points: f64,
    pub championships: usize,
}

/// Summarize every team, in `teams` order.
pub fn summarize_teams(
    teams: &[TeamRecord],
    outcomes: &[SeasonOutcome],
    league_size: usize,
) -> Vec<TeamSummary> {
    let tallies = outcomes
        .iter()
        .map(|outcome| {
            let mut tallies: HashMap<TeamId, TeamTally> = HashMap::new();
            for season in &outcome.teams {
                tallies
                    .entry(season.team_id)
                    .or_default()
                    .record(season, league_size);
            }
            tallies
        })
        .fold(HashMap::new(), |acc, next| merge_maps(acc, next, TeamTally::merge));

    teams
        .iter()
        .map(|team| {
            let tally = tallies.get(&team.id).cloned().unwrap_or_default();
            let per_season = |total: f64| {
                if tally.seasons == 0 {
                    0.0
                } else {
                    total / tally.seasons as f64
                }
            };
            TeamSummary {
                id: team.id,
                nickname: team.nickname.clone(),
                seasons: tally.seasons,
                mean_final_rank: per_season(tally.rank_sum as f64),
                mean_win_pct: per_season(tally.win_pct_sum),
                mean_weekly_points: if tally.weeks == 0 {
                    0.0
                } else {
                    tally.points / tally.weeks as f64
                },
                mean_expected_weekly_points: per_season(tally.expected_sum),
                championships: tally.championships,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
