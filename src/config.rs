//! Converter configuration.
//!
//! Handles loading, validating, and merging a `config.toml`. Stock defaults
//! are overridden by whatever keys the user file sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! default_fit = "contain"     # Used when width+height are given without a fit
//! filter = "lanczos3"         # lanczos3 | catmull-rom | gaussian | triangle
//! pad_color = [0, 0, 0, 0]    # RGBA fill around `contain` content
//!
//! [limits]
//! max_input_bytes = 33554432      # Decoded payload size cap (32 MiB)
//! max_decoded_pixels = 40000000   # width * height cap for source images
//! max_target_dimension = 16383    # Largest requested width/height
//! max_target_pixels = 40000000    # width * height cap for requested output
//!
//! [sniffing]
//! mode = "declared"           # declared | content
//!
//! [processing]
//! max_processes = 4           # Batch workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [resize]
//! pad_color = [255, 255, 255, 255]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    FitMethod, ResampleFilter, RuntimeSettings, SniffMode, WEBP_MAX_DIMENSION,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Converter configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Resize defaults (fit, filter, padding).
    pub resize: ResizeConfig,
    /// Input size and dimension limits.
    pub limits: LimitsConfig,
    /// Source format classification.
    pub sniffing: SniffingConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ConverterConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.filter == ResampleFilter::Nearest {
            return Err(ConfigError::Validation(
                "resize.filter must not be \"nearest\" (point sampling)".into(),
            ));
        }
        if self.limits.max_input_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits.max_input_bytes must be non-zero".into(),
            ));
        }
        if self.limits.max_decoded_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_decoded_pixels must be non-zero".into(),
            ));
        }
        if self.limits.max_target_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_target_pixels must be non-zero".into(),
            ));
        }
        if self.limits.max_target_dimension == 0
            || self.limits.max_target_dimension > WEBP_MAX_DIMENSION
        {
            return Err(ConfigError::Validation(format!(
                "limits.max_target_dimension must be 1-{WEBP_MAX_DIMENSION}"
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Settings consumed when codec runtimes initialize.
    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            max_decoded_pixels: self.limits.max_decoded_pixels,
            filter: self.resize.filter,
            max_output_dimension: self.limits.max_target_dimension,
        }
    }
}

/// Resize defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Fit applied when a request gives dimensions but no fit method.
    pub default_fit: FitMethod,
    /// Resampling kernel.
    pub filter: ResampleFilter,
    /// RGBA fill for the area a `contain` fit leaves uncovered.
    pub pad_color: [u8; 4],
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            default_fit: FitMethod::Contain,
            filter: ResampleFilter::Lanczos3,
            pad_color: [0, 0, 0, 0],
        }
    }
}

/// Input size and dimension limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum decoded payload size in bytes.
    pub max_input_bytes: u64,
    /// Maximum `width * height` of a source image.
    pub max_decoded_pixels: u64,
    /// Maximum requested target width or height.
    pub max_target_dimension: u32,
    /// Maximum requested target `width * height`.
    pub max_target_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 32 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_target_dimension: WEBP_MAX_DIMENSION,
            max_target_pixels: 40_000_000,
        }
    }
}

/// Source format classification settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SniffingConfig {
    /// `declared` trusts the data URL media type, `content` trusts magic bytes.
    pub mode: SniffMode,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ConverterConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ConverterConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ConverterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, or stock defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<ConverterConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# webpify configuration
# =====================
#
# Every key is optional. Delete anything you don't need to change; the
# values below are the built-in defaults.

[resize]
# Fit applied when a width and height are given without a fit method.
#   contain - scale uniformly to fit inside the box, pad the remainder
#   stretch - scale each axis independently, no padding
default_fit = "contain"

# Resampling kernel: lanczos3, catmull-rom, gaussian, triangle.
# Point sampling ("nearest") is rejected.
filter = "lanczos3"

# RGBA color of the padding a `contain` fit adds. Default is transparent.
pad_color = [0, 0, 0, 0]

[limits]
# Largest accepted payload after base64 decoding, in bytes.
max_input_bytes = 33554432

# Largest accepted source image, as width * height.
max_decoded_pixels = 40000000

# Largest accepted target width or height (WebP caps this at 16383).
max_target_dimension = 16383

# Largest accepted target size, as width * height.
max_target_pixels = 40000000

[sniffing]
# How the source format is chosen:
#   declared - from the data URL media type (image/png, image/jpeg, image/webp)
#   content  - from the file signature; the declared type is only a hint
mode = "declared"

[processing]
# Maximum parallel workers for `batch`. Omit for one per CPU core.
# max_processes = 4
"##
}
