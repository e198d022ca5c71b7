// Configuration loading and parsing (league.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::prediction::DEFAULT_PREDICTIONS_FROM_WEEK;
use crate::simulation::{MatchModel, BASE_DRAW_CHANCE, HOME_ADVANTAGE};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("league.toml not found at {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("league.toml at {path} is not valid: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid `{field}` in league.toml: {message}")]
    ValidationError { field: String, message: String },

    #[error("cannot install default {file} into {dir}: {source}")]
    DefaultsCopyError {
        file: &'static str,
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("no defaults/ or config/ directory under {base}; run the league from its project root")]
    MissingDirectories { base: PathBuf },
}

/// Files read from `config/`. Missing ones are installed from `defaults/`.
pub const CONFIG_FILES: [&str; 2] = ["league.toml", "teams.csv"];

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueSettings,
    pub simulation: SimulationConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

impl Config {
    /// Outcome model parameters for simulation and predictions.
    pub fn match_model(&self) -> MatchModel {
        MatchModel::new(self.simulation.home_advantage, self.simulation.draw_chance)
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSettings,
    #[serde(default)]
    simulation: SimulationConfig,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSettings {
    pub name: String,
    /// First week for which championship predictions are computed.
    #[serde(default = "default_predictions_from_week")]
    pub predictions_from_week: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_home_advantage")]
    pub home_advantage: u32,
    #[serde(default = "default_draw_chance")]
    pub draw_chance: u32,
    /// Fixed RNG seed. When absent, every run draws fresh entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            home_advantage: HOME_ADVANTAGE,
            draw_chance: BASE_DRAW_CHANCE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub teams: String,
}

fn default_predictions_from_week() -> u32 {
    DEFAULT_PREDICTIONS_FROM_WEEK
}

fn default_home_advantage() -> u32 {
    HOME_ADVANTAGE
}

fn default_draw_chance() -> u32 {
    BASE_DRAW_CHANCE
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let league_text = read_league_toml(&league_path)?;
    let file: LeagueFile = toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    let config = Config {
        league: file.league,
        simulation: file.simulation,
        db_path: file.database.path,
        data_paths: file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Install any of [`CONFIG_FILES`] missing from `config/` using the copy
/// shipped in `defaults/`. Files already in `config/` are never replaced.
///
/// Returns the paths that were installed. A project without `defaults/` is
/// fine as long as `config/` exists.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::MissingDirectories {
            base: base_dir.to_path_buf(),
        });
    }

    let mut installed = Vec::new();
    for file in CONFIG_FILES {
        let shipped = defaults_dir.join(file);
        let target = config_dir.join(file);
        if target.exists() || !shipped.is_file() {
            continue;
        }

        std::fs::create_dir_all(&config_dir)
            .and_then(|()| std::fs::copy(&shipped, &target))
            .map_err(|source| ConfigError::DefaultsCopyError {
                file,
                dir: config_dir.clone(),
                source,
            })?;
        info!("Installed default {} into {}", file, config_dir.display());
        installed.push(target);
    }

    Ok(installed)
}

/// Install defaults, then load `config/league.toml` from the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_league_toml(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.predictions_from_week == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.predictions_from_week".into(),
            message: "must be at least 1".into(),
        });
    }

    let percentages: &[(&str, u32)] = &[
        ("simulation.home_advantage", config.simulation.home_advantage),
        ("simulation.draw_chance", config.simulation.draw_chance),
    ];
    for (name, val) in percentages {
        if *val > 100 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between 0 and 100 inclusive, got {val}"),
            });
        }
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
