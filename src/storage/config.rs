//! Engine configuration.
//!
//! Tuning constants for normalization, re-indexing and curve generation are
//! carried in an explicit [`EngineConfig`] rather than module-level globals,
//! so callers (and tests) can vary them per analysis.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Riegel-style fatigue exponent.
pub const DEFAULT_FATIGUE_EXPONENT: f64 = 1.06;

/// Milliseconds in one day, the default unit of the indexed time axis.
pub const DEFAULT_DAY_LENGTH_MS: f64 = 86_400_000.0;

/// Default number of evaluations along the trend curve.
pub const DEFAULT_CURVE_POINTS: usize = 50;

/// Upper bound on trend curve evaluations.
pub const MAX_CURVE_POINTS: usize = 10_000;

/// Default number of memoized analyses.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Tuning constants for the trend engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fatigue exponent `k` (k > 1 models slowing down over longer efforts)
    pub fatigue_exponent: f64,
    /// Rates above this value are treated as noise during extraction
    pub max_plausible_rate: Option<f64>,
    /// Length of one unit of the indexed x axis, in milliseconds
    pub day_length_ms: f64,
    /// Number of evenly spaced evaluations on the trend curve
    pub curve_points: usize,
    /// Maximum number of memoized analyses
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fatigue_exponent: DEFAULT_FATIGUE_EXPONENT,
            max_plausible_rate: None,
            day_length_ms: DEFAULT_DAY_LENGTH_MS,
            curve_points: DEFAULT_CURVE_POINTS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Set the fatigue exponent.
    pub fn with_fatigue_exponent(mut self, k: f64) -> Self {
        self.fatigue_exponent = k;
        self
    }

    /// Set the plausibility ceiling for extracted rates.
    pub fn with_max_plausible_rate(mut self, rate: f64) -> Self {
        self.max_plausible_rate = Some(rate);
        self
    }

    /// Set the number of trend curve evaluations.
    pub fn with_curve_points(mut self, points: usize) -> Self {
        self.curve_points = points;
        self
    }

    /// Check that every constant is usable by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fatigue_exponent.is_finite() || self.fatigue_exponent <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fatigue_exponent must be finite and positive, got {}",
                self.fatigue_exponent
            )));
        }

        if !self.day_length_ms.is_finite() || self.day_length_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "day_length_ms must be finite and positive, got {}",
                self.day_length_ms
            )));
        }

        if !(2..=MAX_CURVE_POINTS).contains(&self.curve_points) {
            return Err(ConfigError::Invalid(format!(
                "curve_points must be between 2 and {}, got {}",
                MAX_CURVE_POINTS, self.curve_points
            )));
        }

        if let Some(max) = self.max_plausible_rate {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "max_plausible_rate must be finite and positive, got {}",
                    max
                )));
            }
        }

        Ok(())
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "trendcast", "Trendcast")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from the default location.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate configuration from a specific file.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: EngineConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.validate()?;
    Ok(config)
}

/// Save configuration to the default location.
pub fn save_config(config: &EngineConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to a specific file.
pub fn save_config_to(config: &EngineConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
