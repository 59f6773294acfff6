// Weekly game-log CSV loading.
//
// Expects a header row with `player`, `position` and `week` columns plus one
// numeric column per scoring category. Other columns are ignored. Positions
// may be written as abbreviations (`qb`, `WR`) or as the numeric codes used
// by the historical stat dumps (10 = qb, 20 = rb, 30 = wr, 40 = te).

use std::io::Read;
use std::path::{Path, PathBuf};

use gridsim_core::{CategoryCounts, Position, RawGameLog};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum GameLogError {
    #[error("failed to read game log {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in game log: {0}")]
    Csv(#[from] csv::Error),

    #[error("game log is missing column `{column}`")]
    MissingColumn { column: String },

    #[error("game log validation error: {0}")]
    Validation(String),
}

/// Column positions resolved from the header row.
struct Columns {
    player: usize,
    position: usize,
    week: usize,
    categories: Vec<(String, usize)>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, categories: &[String]) -> Result<Self, GameLogError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| GameLogError::MissingColumn {
                    column: name.to_string(),
                })
        };
        Ok(Columns {
            player: find("player")?,
            position: find("position")?,
            week: find("week")?,
            categories: categories
                .iter()
                .map(|c| find(c).map(|idx| (c.clone(), idx)))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Parse a position cell: an abbreviation or a numeric position code.
/// Anything unrecognised is `Other`.
pub fn parse_position(cell: &str) -> Position {
    if let Some(position) = Position::from_str_pos(cell) {
        return position;
    }
    match cell.trim().parse::<f64>() {
        Ok(code) if code == 10.0 => Position::Quarterback,
        Ok(code) if code == 20.0 => Position::RunningBack,
        Ok(code) if code == 30.0 => Position::WideReceiver,
        Ok(code) if code == 40.0 => Position::TightEnd,
        _ => Position::Other,
    }
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    let value: f64 = cell?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Read game-log rows for the given scoring categories.
///
/// A missing required column fails the whole load. Individual rows that are
/// malformed, have a blank player name, or carry a non-numeric stat are
/// skipped with a warning.
pub fn load_game_logs_from_reader<R: Read>(
    rdr: R,
    categories: &[String],
) -> Result<Vec<RawGameLog>, GameLogError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let columns = Columns::resolve(reader.headers()?, categories)?;

    let mut logs = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed game-log row: {}", e);
                continue;
            }
        };

        let player = record.get(columns.player).unwrap_or("").trim();
        if player.is_empty() {
            warn!("skipping game-log row {}: blank player name", line + 1);
            continue;
        }

        let Some(week) = parse_number(record.get(columns.week)).filter(|w| *w >= 0.0) else {
            warn!("skipping game-log row for '{}': bad week value", player);
            continue;
        };

        let mut counts = CategoryCounts::new();
        let mut bad_category = None;
        for (name, idx) in &columns.categories {
            match parse_number(record.get(*idx)) {
                Some(value) => {
                    counts.insert(name.clone(), value);
                }
                None => {
                    bad_category = Some(name.as_str());
                    break;
                }
            }
        }
        if let Some(name) = bad_category {
            warn!(
                "skipping game-log row for '{}' week {}: non-numeric `{}`",
                player, week, name
            );
            continue;
        }

        logs.push(RawGameLog {
            player: player.to_string(),
            position: parse_position(record.get(columns.position).unwrap_or("")),
            week: week as u32,
            counts,
        });
    }
    Ok(logs)
}

/// Load a game-log CSV file. An input with no usable rows is an error.
pub fn load_game_logs(path: &Path, categories: &[String]) -> Result<Vec<RawGameLog>, GameLogError> {
    let file = std::fs::File::open(path).map_err(|e| GameLogError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let logs = load_game_logs_from_reader(file, categories)?;
    if logs.is_empty() {
        return Err(GameLogError::Validation(format!(
            "no usable rows in {}",
            path.display()
        )));
    }
    info!("Loaded {} game-log rows from {}", logs.len(), path.display());
    Ok(logs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
