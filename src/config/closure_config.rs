//! Closure Configuration - search defaults, approximation policy, data source
//! and server settings as operator-tunable TOML values
//!
//! Every struct implements `Default`, so a missing file or a partial file
//! behaves exactly like the built-in defaults for the keys it leaves out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::types::ApproximationPolicy;

/// Environment variable holding the path of the config file.
pub const CONFIG_ENV: &str = "WELL_CLOSURE_CONFIG";

/// Environment variable overriding `server.addr`.
pub const SERVER_ADDR_ENV: &str = "WELL_CLOSURE_SERVER_ADDR";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "closure_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `ClosureConfig::load()` which searches:
/// 1. `$WELL_CLOSURE_CONFIG` env var
/// 2. `./closure_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosureConfig {
    /// Defaults for closure searches
    #[serde(default)]
    pub search: SearchConfig,

    /// Bounded-runtime approximation policy
    #[serde(default)]
    pub approximation: ApproximationConfig,

    /// Well table location and extra column aliases
    #[serde(default)]
    pub data: DataConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl ClosureConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WELL_CLOSURE_CONFIG` environment variable
    /// 2. `./closure_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded closure config from {CONFIG_ENV}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV} points to non-existent file, falling back");
            }
        }

        // 2. Check ./closure_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded closure config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Closure config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Horizon and subset caps must be >= 1
    /// - Progress step must be a finite fraction in [0, 1]
    /// - Approximation limits must be >= 1
    /// - Server address must parse as `host:port`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.search;
        if s.default_horizon_days == 0 {
            errors.push("search.default_horizon_days must be >= 1".to_string());
        }
        if s.default_max_subset_size == 0 {
            errors.push("search.default_max_subset_size must be >= 1".to_string());
        }
        // NaN comparisons silently pass, so check finiteness explicitly
        if !s.progress_step.is_finite() || !(0.0..=1.0).contains(&s.progress_step) {
            errors.push(format!(
                "search.progress_step = {} must be a fraction between 0 and 1",
                s.progress_step
            ));
        }

        let a = &self.approximation;
        if a.top_n == 0 {
            errors.push("approximation.top_n must be >= 1".to_string());
        }
        if a.max_subset_size == 0 {
            errors.push("approximation.max_subset_size must be >= 1".to_string());
        }

        if self.server.addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a valid host:port socket address",
                self.server.addr
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Effective bind address: `$WELL_CLOSURE_SERVER_ADDR` wins over the file.
    pub fn server_addr(&self) -> String {
        match std::env::var(SERVER_ADDR_ENV) {
            Ok(addr) if !addr.trim().is_empty() => addr,
            _ => self.server.addr.clone(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Search Defaults
// ============================================================================

/// Values used when a caller does not supply them per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Shutdown duration (days)
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u32,

    /// Largest number of wells closed together
    #[serde(default = "default_max_subset_size")]
    pub default_max_subset_size: usize,

    /// Wall-clock budget for a single search (0 disables)
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,

    /// Completion fraction between two progress callbacks
    #[serde(default = "default_progress_step")]
    pub progress_step: f64,
}

fn default_horizon_days() -> u32 { 5 }
fn default_max_subset_size() -> usize { 3 }
fn default_time_limit_secs() -> u64 { 30 }
fn default_progress_step() -> f64 { 0.05 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: default_horizon_days(),
            default_max_subset_size: default_max_subset_size(),
            time_limit_secs: default_time_limit_secs(),
            progress_step: default_progress_step(),
        }
    }
}

impl SearchConfig {
    /// `None` when searches are unbounded.
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs))
    }
}

// ============================================================================
// Approximation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproximationConfig {
    /// Highest-flow wells kept when approximating
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Combination cap when approximating
    #[serde(default = "default_approx_max_subset_size")]
    pub max_subset_size: usize,
}

fn default_top_n() -> usize { 30 }
fn default_approx_max_subset_size() -> usize { 6 }

impl Default for ApproximationConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_subset_size: default_approx_max_subset_size(),
        }
    }
}

impl ApproximationConfig {
    pub fn policy(&self) -> ApproximationPolicy {
        ApproximationPolicy {
            top_n: self.top_n,
            max_subset_size: self.max_subset_size,
        }
    }
}

// ============================================================================
// Data Source
// ============================================================================

/// Well table location and header aliases added to the built-in ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Default well CSV (empty = none)
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub extra_well_columns: Vec<String>,

    #[serde(default)]
    pub extra_field_columns: Vec<String>,

    #[serde(default)]
    pub extra_flow_columns: Vec<String>,

    #[serde(default)]
    pub extra_profit_columns: Vec<String>,
}

impl DataConfig {
    /// Configured default table, if any.
    pub fn path(&self) -> Option<&Path> {
        let trimmed = self.path.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `WELL_CLOSURE_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
