//! Engine configuration module.
//!
//! Handles loading, validating, and merging `lenscalc.toml`. User files are
//! sparse: stock defaults are the base layer and user values override them
//! key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [optics]
//! coc_divisor = 1500.0        # circle of confusion = sensor diagonal / coc_divisor
//!
//! [crop]
//! min_display_size = 20.0     # smallest crop-frame side (preview px) shown as visible
//!
//! [exposure]
//! max_duration_secs = 28800.0 # longer exposures are reported as out of range
//!
//! [calibration]
//! path = "calibrations.json"  # calibration record file, relative to the config dir
//!
//! [processing]
//! max_processes = 4           # DoF table workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::crop::DEFAULT_MIN_DISPLAY_SIZE;
use crate::exposure::MAX_REPRESENTABLE_SECONDS;
use crate::optics::DEFAULT_COC_DIVISOR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "lenscalc.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `lenscalc.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub optics: OpticsConfig,
    pub crop: CropConfig,
    pub exposure: ExposureConfig,
    pub calibration: CalibrationConfig,
    pub processing: ProcessingConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.optics.coc_divisor.is_finite() && self.optics.coc_divisor > 0.0) {
            return Err(ConfigError::Validation(
                "optics.coc_divisor must be positive".into(),
            ));
        }
        if !(self.crop.min_display_size.is_finite() && self.crop.min_display_size >= 0.0) {
            return Err(ConfigError::Validation(
                "crop.min_display_size must be zero or positive".into(),
            ));
        }
        if !(self.exposure.max_duration_secs.is_finite() && self.exposure.max_duration_secs > 0.0)
        {
            return Err(ConfigError::Validation(
                "exposure.max_duration_secs must be positive".into(),
            ));
        }
        if self.calibration.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "calibration.path must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpticsConfig {
    /// Circle of confusion = sensor diagonal / this value.
    pub coc_divisor: f64,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            coc_divisor: DEFAULT_COC_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Smallest crop-frame side, in preview pixels, still reported as visible.
    pub min_display_size: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_display_size: DEFAULT_MIN_DISPLAY_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExposureConfig {
    /// Longest exposure, in seconds, shown as a number.
    pub max_duration_secs: f64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: MAX_REPRESENTABLE_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    /// Calibration record file. Relative paths resolve against the config directory.
    pub path: PathBuf,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("calibrations.json"),
        }
    }
}

impl CalibrationConfig {
    /// Absolute (or config-dir-relative) location of the record file.
    pub fn resolve(&self, config_dir: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            config_dir.join(&self.path)
        }
    }
}

/// Worker pool for `dof-table`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Upper bound on DoF table workers; `None` uses every core.
    pub max_processes: Option<usize>,
}

/// Number of rayon workers for a DoF table: the configured bound, never more
/// than the machine's cores and never fewer than one.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    match config.max_processes {
        Some(limit) => limit.clamp(1, cores),
        None => cores,
    }
}

// =============================================================================
// Layering: stock defaults <- lenscalc.toml
// =============================================================================

/// `EngineConfig::default()` as a TOML table, the bottom layer of every load.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(EngineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults failed to serialize: {e}")))
}

/// Layer a sparse user table over `base`.
///
/// Sections such as `[optics]` combine key by key, so setting only
/// `coc_divisor` keeps the stock value of every other key. Scalars and arrays
/// from the user file win outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match overlay {
        toml::Value::Table(user) => {
            let mut merged = match base {
                toml::Value::Table(stock) => stock,
                _ => return toml::Value::Table(user),
            };
            for (key, user_value) in user {
                let layered = match merged.remove(&key) {
                    Some(stock_value) => merge_toml(stock_value, user_value),
                    None => user_value,
                };
                merged.insert(key, layered);
            }
            toml::Value::Table(merged)
        }
        scalar => scalar,
    }
}

/// Parse `lenscalc.toml` in `dir` without applying defaults.
///
/// A directory without the file yields `Ok(None)`: running with stock
/// settings is the normal case for a fresh install.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(toml::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `lenscalc.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<EngineConfig, ConfigError> {
    resolve_config(load_raw_config(dir)?)
}

/// Returns a fully-commented stock `lenscalc.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# lenscalc configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Optics
# ---------------------------------------------------------------------------
[optics]
# Circle of confusion = sensor diagonal / coc_divisor.
# 1500 is the classic "d/1500" criterion. Larger values are stricter.
coc_divisor = 1500.0

# ---------------------------------------------------------------------------
# Crop frame overlay
# ---------------------------------------------------------------------------
[crop]
# Smallest crop-frame side, in preview pixels, still reported as visible.
min_display_size = 20.0

# ---------------------------------------------------------------------------
# Exposure
# ---------------------------------------------------------------------------
[exposure]
# Exposures longer than this many seconds are reported as out of range.
max_duration_secs = 28800.0

# ---------------------------------------------------------------------------
# Calibration records
# ---------------------------------------------------------------------------
[calibration]
# JSON file holding calibration records, relative to this config directory.
path = "calibrations.json"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for DoF tables.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
