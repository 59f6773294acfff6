// Plain-text run report: header, one player table per roster slot, and the
// team table.

use std::fmt::Write;

use chrono::{DateTime, Local};
use gridsim_core::{LeagueSettings, PlayerSummary, SimulationResults, TeamSummary};

/// Render the full report as one string.
pub fn render(
    results: &SimulationResults,
    settings: &LeagueSettings,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();
    render_header(&mut out, results, settings, generated_at);
    for &slot in &settings.roster_slots {
        let _ = writeln!(out);
        let _ = writeln!(out, "== {slot} ==");
        let _ = writeln!(out, "{}", player_header());
        for (i, player) in results.slot_summaries(slot).into_iter().enumerate() {
            let _ = writeln!(out, "{:>4}  {}", i + 1, format_player_row(player));
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "== teams ==");
    let _ = writeln!(out, "{}", team_header());
    for team in &results.teams {
        let _ = writeln!(out, "{}", format_team_row(team));
    }
    out
}

fn render_header(
    out: &mut String,
    results: &SimulationResults,
    settings: &LeagueSettings,
    generated_at: DateTime<Local>,
) {
    let _ = writeln!(
        out,
        "gridsim report  {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        out,
        "seed {} | {} seasons x {} weeks | {} teams",
        results.base_seed,
        results.seasons.len(),
        settings.season_length,
        results.league_size
    );
    let _ = writeln!(
        out,
        "injury policy {} | tiers by {} | deal {}",
        settings.injury_policy, settings.tier_metric, settings.assignment_mode
    );
}

fn player_header() -> String {
    format!(
        "{:>4}  {:<24} {:>4} {:>7} {:>7} {:>6} {:>6} {:>6} {:>7}",
        "#", "player", "rank", "ppg", "util", "cons", "avg", "harm", "champ%"
    )
}

/// Format an optional statistic, `-` when absent.
pub fn format_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

/// One player line (without the leading row number).
pub fn format_player_row(player: &PlayerSummary) -> String {
    format!(
        "{:<24} {:>4} {:>7.2} {:>7.2} {:>6.3} {:>6} {:>6} {:>7}",
        truncate(&player.name, 24),
        player
            .position_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".into()),
        player.points_per_game,
        player.utility,
        player.consistency,
        format_opt(player.average_team_ranking, 2),
        format_opt(player.harmonic_team_ranking, 2),
        format_opt(player.champion_pct.map(|p| p * 100.0), 1),
    )
}

fn team_header() -> String {
    format!(
        "{:<4} {:<16} {:>6} {:>9} {:>6} {:>8} {:>8}",
        "id", "team", "titles", "avg rank", "win%", "pts/wk", "exp/wk"
    )
}

pub fn format_team_row(team: &TeamSummary) -> String {
    format!(
        "{:<4} {:<16} {:>6} {:>9.2} {:>6.1} {:>8.2} {:>8.2}",
        team.id.to_string(),
        truncate(&team.nickname, 16),
        team.championships,
        team.mean_final_rank,
        team.mean_win_pct * 100.0,
        team.mean_weekly_points,
        team.mean_expected_weekly_points,
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        s.chars().take(width.saturating_sub(1)).chain(['~']).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridsim_core::{PlayerId, Position, Slot, TeamId};

    fn summary(champion_pct: Option<f64>) -> PlayerSummary {
        PlayerSummary {
            id: PlayerId(7),
            name: "Drew Brees".into(),
            position: Position::Quarterback,
            slot: Some(Slot::new(Position::Quarterback, 1)),
            position_rank: Some(3),
            points_per_game: 21.456,
            utility: 18.2,
            consistency: 0.848,
            seasons_rostered: champion_pct.map_or(0, |_| 10),
            average_team_ranking: champion_pct.map(|_| 4.5),
            harmonic_team_ranking: champion_pct.map(|_| 2.25),
            champion_pct,
            mean_weekly_score: champion_pct.map(|_| 21.0),
        }
    }

    #[test]
    fn player_row_formats_statistics() {
        let row = format_player_row(&summary(Some(0.125)));
        assert!(row.starts_with("Drew Brees"));
        assert!(row.contains("21.46"));
        assert!(row.contains("0.848"));
        assert!(row.contains("4.50"));
        assert!(row.contains("12.5"));
    }

    #[test]
    fn unrostered_player_shows_dashes() {
        let row = format_player_row(&summary(None));
        assert_eq!(row.matches(" -").count(), 3);
    }

    #[test]
    fn team_row_formats_percentages() {
        let team = TeamSummary {
            id: TeamId(2),
            nickname: "Seahawks".into(),
            seasons: 10,
            mean_final_rank: 4.5,
            mean_win_pct: 0.5625,
            mean_weekly_points: 101.333,
            mean_expected_weekly_points: 118.456,
            championships: 2,
        };
        let row = format_team_row(&team);
        assert!(row.starts_with("T02"));
        assert!(row.contains("Seahawks"));
        assert!(row.contains("56.2") || row.contains("56.3"));
        assert!(row.ends_with("101.33   118.46"));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn format_opt_handles_none() {
        assert_eq!(format_opt(None, 2), "-");
        assert_eq!(format_opt(Some(1.0 / 3.0), 2), "0.33");
    }
}
