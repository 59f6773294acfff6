// gridsim entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries the report)
// 2. Load config, copying defaults into config/ if needed
// 3. Load game logs and aggregate players
// 4. Build the league (tiering + pool check)
// 5. Run the trials
// 6. Print the report

use std::path::Path;

use gridsim_cli::{config, gamelog, report};
use gridsim_core::{IdAllocator, League, PlayerDb};

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("gridsim starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} teams, {} slots, {} seasons of {} weeks",
        config.league.league_size,
        config.league.roster_slots.len(),
        config.league.num_seasons,
        config.league.season_length
    );

    // 3. Load game logs and aggregate players
    let categories: Vec<String> = config.scoring.categories().map(str::to_string).collect();
    let logs = gamelog::load_game_logs(Path::new(&config.data_paths.game_logs), &categories)
        .context("failed to load game logs")?;

    let mut ids = IdAllocator::new();
    let db = PlayerDb::from_game_logs(&logs, &config.scoring, &mut ids)
        .context("failed to aggregate players")?;

    // 4. Build the league
    let mut league =
        League::new(db, config.league.clone(), ids).context("failed to build league")?;

    // 5. Run the trials
    league.simulate().context("simulation failed")?;
    let results = league.results()?;

    // 6. Print the report
    print!(
        "{}",
        report::render(results, league.settings(), chrono::Local::now())
    );

    info!("gridsim finished");
    Ok(())
}

/// Initialize tracing to stderr so the report on stdout stays clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    EnvFilter::new("gridsim=info,gridsim_core=info,gridsim_cli=info,warn")
                }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
