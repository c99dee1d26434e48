//! Configuration file loading with precedence handling.

use crate::layout::{ColumnCount, PlacementRule, DEFAULT_CHUNK_SIZE};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "STREAMFEED_CONFIG";
/// Environment variable overriding the grid column count.
pub const COLUMNS_ENV: &str = "STREAMFEED_COLUMNS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    /// A setting parsed but holds an unusable value.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/streamfeed/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Columns in grid mode.
    #[serde(default)]
    pub column_count: Option<usize>,

    /// Horizontal gap between columns, in points.
    #[serde(default)]
    pub column_spacing: Option<f64>,

    #[serde(default)]
    pub placement_rule: Option<PlacementRule>,

    /// Placements per spatial index chunk.
    #[serde(default)]
    pub chunk_size: Option<usize>,

    /// Default grid/list choice for every feed.
    #[serde(default)]
    pub grid_view: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub column_count: ColumnCount,
    pub column_spacing: f64,
    pub placement_rule: PlacementRule,
    pub chunk_size: usize,
    pub grid_view: bool,
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            column_count: ColumnCount::new(2).unwrap_or(ColumnCount::ONE),
            column_spacing: 12.0,
            placement_rule: PlacementRule::ShortestFirst,
            chunk_size: DEFAULT_CHUNK_SIZE,
            grid_view: true,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/streamfeed/streamfeed.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("streamfeed").join("streamfeed.log"),
        None => PathBuf::from("streamfeed.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/streamfeed/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("streamfeed").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `STREAMFEED_CONFIG` environment variable
/// 3. Default path `~/.config/streamfeed/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for a zero column count or a
/// negative or non-finite column spacing.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let column_count = match config.column_count {
        Some(count) => parse_column_count(count)?,
        None => defaults.column_count,
    };
    let column_spacing = config.column_spacing.unwrap_or(defaults.column_spacing);
    if !column_spacing.is_finite() || column_spacing < 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "column_spacing",
            reason: format!("must be a non-negative number (got {column_spacing})"),
        });
    }

    Ok(ResolvedConfig {
        column_count,
        column_spacing,
        placement_rule: config.placement_rule.unwrap_or(defaults.placement_rule),
        chunk_size: config.chunk_size.unwrap_or(defaults.chunk_size).max(1),
        grid_view: config.grid_view.unwrap_or(defaults.grid_view),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `STREAMFEED_COLUMNS`: Override column count
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the variable is set but is not a
/// positive integer.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(COLUMNS_ENV) {
        let count = raw.trim().parse::<usize>().map_err(|e| ConfigError::InvalidValue {
            field: COLUMNS_ENV,
            reason: format!("{raw:?}: {e}"),
        })?;
        config.column_count = parse_column_count(count)?;
    }
    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    columns_override: Option<ColumnCount>,
    placement_override: Option<PlacementRule>,
    grid_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(columns) = columns_override {
        config.column_count = columns;
    }
    if let Some(rule) = placement_override {
        config.placement_rule = rule;
    }
    if let Some(grid) = grid_override {
        config.grid_view = grid;
    }
    config
}

fn parse_column_count(count: usize) -> Result<ColumnCount, ConfigError> {
    ColumnCount::new(count).map_err(|e| ConfigError::InvalidValue {
        field: "column_count",
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
