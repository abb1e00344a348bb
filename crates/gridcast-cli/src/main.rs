// Offline forecast harness entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not the terminal)
// 2. Load config (copying defaults on first run)
// 3. Open the SQLite store
// 4. Wire the CSV ranking provider and JSON fixture providers
// 5. Dispatch the requested command and print its report as JSON

mod fixtures;

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;

use fixtures::JsonFixtureProvider;
use gridcast_core::config::{self, Config};
use gridcast_core::rankings_csv::CsvRankingProvider;
use gridcast_core::store::SqliteStore;
use gridcast_engine::service::{
    DriftRequest, ForecastService, PredictionRequest, RetroRequest,
};
use gridcast_engine::sim::Scenario;

const USAGE: &str = "usage: gridcast <command>\n\
    \n\
    commands:\n\
    \x20 predict [removed player name]   forecast the user's picks, optionally\n\
    \x20                                 conditioned on a player being gone\n\
    \x20 drift                           weekly board drift report\n\
    \x20 retro                           score the last prediction against the\n\
    \x20                                 real draft and recalibrate weights";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the terminal)
    init_tracing()?;
    info!("gridcast starting up");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        bail!("{USAGE}");
    };

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "config loaded: league={}, {} teams, {} rounds",
        config.league.name, config.league.team_count, config.league.rounds
    );

    // 3. Open the SQLite store
    let store_path = resolve_store_path(&config.store_path)?;
    let store = Arc::new(SqliteStore::open(&store_path).context("failed to open store")?);
    info!("store opened at {}", store_path);

    // 4. Wire providers
    let rankings = CsvRankingProvider::new(&config.data.rankings);
    let history = JsonFixtureProvider::new(&config.data.history, &config.data.draft);
    let drafts = JsonFixtureProvider::new(&config.data.history, &config.data.draft);

    let service = ForecastService::new(
        rankings,
        history,
        drafts,
        store,
        config.simulation.clone(),
        config.calibration.clone(),
        config.snapshot_ttl_days,
    );

    // 5. Dispatch
    match command {
        "predict" => {
            let removed = args[1..].join(" ");
            let scenario = if removed.is_empty() {
                None
            } else {
                info!("conditioning on '{}' being off the board", removed);
                Some(Scenario {
                    removed_player: Some(removed),
                    forced_run: None,
                })
            };
            let response = service
                .predict(prediction_request(&config, scenario))
                .await
                .context("prediction failed")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "drift" => {
            let report = service
                .board_drift(DriftRequest {
                    league_id: config.league.league_id.clone(),
                    user_slot: config.league.user_slot,
                    team_count: config.league.team_count,
                })
                .await
                .context("drift report failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "retro" => {
            let report = service
                .retrospective(RetroRequest {
                    league_id: config.league.league_id.clone(),
                    season: config.league.season.clone(),
                })
                .await
                .context("retrospective failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }

    info!("gridcast finished");
    Ok(())
}

fn prediction_request(config: &Config, scenario: Option<Scenario>) -> PredictionRequest {
    PredictionRequest {
        league_id: config.league.league_id.clone(),
        season: config.league.season.clone(),
        user_slot: config.league.user_slot,
        team_count: config.league.team_count,
        rounds: config.league.rounds,
        trials: config.simulation.trials,
        timeout_ms: None,
        scenario,
    }
}

/// Absolute store paths are used verbatim; relative ones land in the
/// per-user data directory so repeat runs share state regardless of cwd.
fn resolve_store_path(configured: &str) -> anyhow::Result<String> {
    let path = std::path::Path::new(configured);
    if path.is_absolute() {
        return Ok(configured.to_string());
    }
    match directories::ProjectDirs::from("", "", "gridcast") {
        Some(dirs) => {
            let data_dir = dirs.data_dir();
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            Ok(data_dir.join(path).to_string_lossy().into_owned())
        }
        None => Ok(configured.to_string()),
    }
}

/// Initialize tracing to log to a file (stdout carries the JSON reports).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gridcast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridcast=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
