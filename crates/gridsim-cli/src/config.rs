// Configuration loading and parsing (league.toml, scoring.toml).

use std::path::{Path, PathBuf};

use gridsim_core::{
    AssignmentMode, InjuryPolicy, LeagueSettings, ScoringWeights, SimError, Slot, TierMetric,
};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Map an engine error raised while checking the `[league]` table.
    fn from_league(field: &str, err: SimError) -> Self {
        match err {
            SimError::InvalidSettings { field, message } => ConfigError::ValidationError {
                field: format!("league.{field}"),
                message,
            },
            other => ConfigError::invalid(field, other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueSettings,
    pub scoring: ScoringWeights,
    pub data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub game_logs: String,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSection,
    data_paths: DataPaths,
}

/// The `[league]` table as written. Enum-valued settings stay strings here so
/// bad values produce a validation error naming the field.
#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    size: usize,
    roster_slots: Vec<String>,
    season_length: usize,
    num_seasons: usize,
    #[serde(default)]
    min_games_played: usize,
    #[serde(default)]
    injury_policy: Option<String>,
    #[serde(default)]
    tier_metric: Option<String>,
    #[serde(default)]
    assignment_mode: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    nicknames: Vec<String>,
}

impl LeagueSection {
    fn into_settings(self) -> Result<LeagueSettings, ConfigError> {
        let roster_slots = self
            .roster_slots
            .iter()
            .map(|label| label.parse::<Slot>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::from_league("league.roster_slots", e))?;

        let injury_policy = match self.injury_policy {
            Some(s) => s
                .parse::<InjuryPolicy>()
                .map_err(|e| ConfigError::from_league("league.injury_policy", e))?,
            None => InjuryPolicy::default(),
        };
        let tier_metric = match self.tier_metric {
            Some(s) => s
                .parse::<TierMetric>()
                .map_err(|e| ConfigError::from_league("league.tier_metric", e))?,
            None => TierMetric::default(),
        };
        let assignment_mode = match self.assignment_mode {
            Some(s) => s
                .parse::<AssignmentMode>()
                .map_err(|e| ConfigError::from_league("league.assignment_mode", e))?,
            None => AssignmentMode::default(),
        };

        Ok(LeagueSettings {
            league_size: self.size,
            roster_slots,
            min_games_played: self.min_games_played,
            season_length: self.season_length,
            num_seasons: self.num_seasons,
            injury_policy,
            tier_metric,
            assignment_mode,
            seed: self.seed,
            nicknames: self.nicknames,
        })
    }
}

// ---------------------------------------------------------------------------
// scoring.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ScoringFile {
    #[serde(default)]
    category: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryEntry {
    name: String,
    weight: f64,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/league.toml` and `config/scoring.toml` relative
/// to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league.into_settings()?;

    // --- scoring.toml ---
    let scoring_path = config_dir.join("scoring.toml");
    let scoring_text = read_file(&scoring_path)?;
    let scoring_file: ScoringFile =
        toml::from_str(&scoring_text).map_err(|e| ConfigError::ParseError {
            path: scoring_path.clone(),
            source: e,
        })?;
    let scoring = ScoringWeights::new(
        scoring_file
            .category
            .into_iter()
            .map(|c| (c.name.trim().to_string(), c.weight))
            .collect(),
    )
    .map_err(|e| ConfigError::invalid("scoring.category", e.to_string()))?;

    let config = Config {
        league,
        scoring,
        data_paths: league_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Files a run reads from `config/`, each seeded from `defaults/`.
pub const CONFIG_FILES: [&str; 2] = ["league.toml", "scoring.toml"];

/// Seed `config/` from `defaults/` for every run file that is not there yet.
/// Returns the seeded paths in `CONFIG_FILES` order. A file already present in
/// `config/` is left alone, even if it differs from its default.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let seed_error = |message: String| ConfigError::DefaultsCopyError { message };

    let mut seeded = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        let content = std::fs::read(&source).map_err(|e| {
            seed_error(format!(
                "config/{name} is missing and defaults/{name} cannot seed it ({e}); \
                 run gridsim from a directory holding defaults/ or config/"
            ))
        })?;
        std::fs::create_dir_all(&config_dir)
            .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    seed_error(format!("cannot write seeded {}: {e}", target.display()))
                })?;
                tracing::info!("Seeded {} from defaults", target.display());
                seeded.push(target);
            }
            // Another process seeded it first.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(seed_error(format!("cannot create {}: {e}", target.display())));
            }
        }
    }

    Ok(seeded)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config
        .league
        .validate()
        .map_err(|e| ConfigError::from_league("league", e))?;

    if config.data_paths.game_logs.trim().is_empty() {
        return Err(ConfigError::invalid(
            "data_paths.game_logs",
            "must not be empty",
        ));
    }

    if config.league.nicknames.len() > config.league.league_size {
        tracing::warn!(
            "{} nicknames configured for {} teams; extras are ignored",
            config.league.nicknames.len(),
            config.league.league_size
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
