// Configuration loading and parsing (config/gridcast.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
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

// ---------------------------------------------------------------------------
// gridcast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire gridcast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    league: LeagueConfig,
    simulation: SimulationConfig,
    calibration: CalibrationConfig,
    store: StoreSection,
    data: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub league_id: String,
    pub season: String,
    pub team_count: usize,
    pub rounds: usize,
    /// "dynasty" or "redraft".
    pub format: String,
    #[serde(default)]
    pub superflex: bool,
    /// The user's draft slot (1-indexed).
    pub user_slot: usize,
}

impl LeagueConfig {
    pub fn is_dynasty(&self) -> bool {
        self.format.eq_ignore_ascii_case("dynasty")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Monte Carlo trial count per request.
    pub trials: usize,
    /// How many top-ranked remaining players are scored per pick.
    pub candidate_pool: usize,
    /// Shortlist length per pick of interest.
    pub shortlist_size: usize,
    /// Ranking pool size to request from the provider.
    pub pool_size: usize,
}

/// Tunable calibration constants. The defaults are hand-tuned values carried
/// over from production; they are configuration, not semantics.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    pub learning_rate: f64,
    pub ema_smoothing: f64,
    pub weight_floor: f64,
    pub weight_ceiling: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            learning_rate: 0.08,
            ema_smoothing: 0.7,
            weight_floor: crate::weights::WEIGHT_FLOOR,
            weight_ceiling: crate::weights::WEIGHT_CEILING,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StoreSection {
    path: String,
    snapshot_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Ranking pool CSV for the offline provider.
    pub rankings: String,
    /// League history JSON fixture.
    pub history: String,
    /// Completed-draft JSON fixture (used by the retrospective command).
    pub draft: String,
}

/// Top-level assembled config.
#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub simulation: SimulationConfig,
    pub calibration: CalibrationConfig,
    pub store_path: String,
    pub snapshot_ttl_days: i64,
    pub data: DataPaths,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/gridcast.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("gridcast.toml");
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;

    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        league: file.league,
        simulation: file.simulation,
        calibration: file.calibration,
        store_path: file.store.path,
        snapshot_ttl_days: file.store.snapshot_ttl_days,
        data: file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure `config/gridcast.toml` exists by copying it from `defaults/` when
/// missing. Returns whether a copy was made.
pub fn ensure_config_files(base_dir: &Path) -> Result<bool, ConfigError> {
    let default_path = base_dir.join("defaults").join("gridcast.toml");
    let config_dir = base_dir.join("config");
    let target = config_dir.join("gridcast.toml");

    if target.exists() {
        return Ok(false);
    }
    if !default_path.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor defaults/gridcast.toml found in {}; \
                 run from the project root or ensure defaults/ is present",
                target.display(),
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&default_path, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", default_path.display()),
    })?;

    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying defaults first when needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.team_count == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.team_count".into(),
            message: "must be greater than 0".into(),
        });
    }
    if league.rounds == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.rounds".into(),
            message: "must be greater than 0".into(),
        });
    }
    if league.user_slot == 0 || league.user_slot > league.team_count {
        return Err(ConfigError::ValidationError {
            field: "league.user_slot".into(),
            message: format!(
                "must be between 1 and team_count ({}), got {}",
                league.team_count, league.user_slot
            ),
        });
    }
    if !matches!(league.format.to_lowercase().as_str(), "dynasty" | "redraft") {
        return Err(ConfigError::ValidationError {
            field: "league.format".into(),
            message: format!("must be \"dynasty\" or \"redraft\", got {:?}", league.format),
        });
    }

    let sim = &config.simulation;
    let sim_fields: &[(&str, usize)] = &[
        ("simulation.trials", sim.trials),
        ("simulation.candidate_pool", sim.candidate_pool),
        ("simulation.shortlist_size", sim.shortlist_size),
        ("simulation.pool_size", sim.pool_size),
    ];
    for (name, val) in sim_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let cal = &config.calibration;
    if !(0.0..1.0).contains(&cal.learning_rate) || cal.learning_rate == 0.0 {
        return Err(ConfigError::ValidationError {
            field: "calibration.learning_rate".into(),
            message: format!("must be in (0, 1), got {}", cal.learning_rate),
        });
    }
    if !(0.0..1.0).contains(&cal.ema_smoothing) {
        return Err(ConfigError::ValidationError {
            field: "calibration.ema_smoothing".into(),
            message: format!("must be in [0, 1), got {}", cal.ema_smoothing),
        });
    }
    if cal.weight_floor <= 0.0 || cal.weight_floor >= cal.weight_ceiling {
        return Err(ConfigError::ValidationError {
            field: "calibration.weight_floor".into(),
            message: format!(
                "must be positive and below weight_ceiling ({}), got {}",
                cal.weight_ceiling, cal.weight_floor
            ),
        });
    }

    if config.snapshot_ttl_days <= 0 {
        return Err(ConfigError::ValidationError {
            field: "store.snapshot_ttl_days".into(),
            message: format!("must be > 0, got {}", config.snapshot_ttl_days),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
