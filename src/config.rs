//! Editor configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the config directory (default: the
//! current directory) overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "png"            # png | jpg | webp | tiff | source
//! quality = 90              # JPEG quality (1-100)
//! work_dir = ".filterkit"   # Where edit-session outputs are written
//!
//! [filters]
//! posterize_bits = 4        # High bits kept per channel (1-8)
//! solarize_threshold = 128  # Channels at or above this are inverted
//! blur_sigma = 2.0          # Gaussian blur standard deviation
//! sepia_intensity = 1.0     # 0.0 = untouched, 1.0 = full sepia
//!
//! [display]
//! label = "generic"         # generic | filter-name
//!
//! [processing]
//! max_processes = 4         # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [filters]
//! blur_sigma = 4.5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{FilterParams, Quality};
use crate::record::LabelStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Output encoding and location.
    pub output: OutputConfig,
    /// Tunables for parameterised filters.
    pub filters: FiltersConfig,
    /// How images are labelled in history listings.
    pub display: DisplayConfig,
    /// Parallel batch settings.
    pub processing: ProcessingConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if !(1..=8).contains(&self.filters.posterize_bits) {
            return Err(ConfigError::Validation(
                "filters.posterize_bits must be 1-8".into(),
            ));
        }
        if !(self.filters.blur_sigma.is_finite() && self.filters.blur_sigma > 0.0) {
            return Err(ConfigError::Validation(
                "filters.blur_sigma must be a positive number".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.filters.sepia_intensity) {
            return Err(ConfigError::Validation(
                "filters.sepia_intensity must be between 0.0 and 1.0".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Backend parameters derived from `[filters]` and `[output]`.
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            posterize_bits: self.filters.posterize_bits,
            solarize_threshold: self.filters.solarize_threshold,
            blur_sigma: self.filters.blur_sigma,
            sepia_intensity: self.filters.sepia_intensity,
            quality: Quality::new(self.output.quality),
        }
    }
}

/// Encoding of written images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Webp,
    Tiff,
    /// Keep the source image's extension.
    Source,
}

impl OutputFormat {
    /// File extension to write for a given source image.
    pub fn extension_for(self, source: &Path) -> String {
        match self {
            OutputFormat::Png => "png".into(),
            OutputFormat::Jpg => "jpg".into(),
            OutputFormat::Webp => "webp".into(),
            OutputFormat::Tiff => "tiff".into(),
            OutputFormat::Source => crate::naming::extension_or(source, "png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Directory for edit-session outputs.
    pub work_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: 90,
            work_dir: PathBuf::from(".filterkit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    pub posterize_bits: u8,
    pub solarize_threshold: u8,
    pub blur_sigma: f32,
    pub sepia_intensity: f32,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        let params = FilterParams::default();
        Self {
            posterize_bits: params.posterize_bits,
            solarize_threshold: params.solarize_threshold,
            blur_sigma: params.blur_sigma,
            sepia_intensity: params.sepia_intensity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// `generic` labels every filtered image "Edited image";
    /// `filter-name` uses the applied filter's display name.
    pub label: LabelStyle,
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
    toml::Value::try_from(EditorConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EditorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<EditorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("loaded config from {}: {:?}", dir.display(), config);
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# filterkit configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Encoding for written images: png, jpg, webp, tiff, or source
# (keep whatever extension the input image had).
format = "png"

# JPEG quality (1 = worst, 100 = best). Other formats are lossless.
quality = 90

# Directory where edit-session outputs are written.
work_dir = ".filterkit"

# ---------------------------------------------------------------------------
# Filter tunables
# ---------------------------------------------------------------------------
[filters]
# Posterize: high bits kept per channel (1-8). Fewer bits = fewer tones.
posterize_bits = 4

# Solarize: channel values at or above this are inverted (0-255).
solarize_threshold = 128

# Blur: Gaussian standard deviation in pixels.
blur_sigma = 2.0

# Sepia: 0.0 leaves the image untouched, 1.0 is full sepia tone.
sepia_intensity = 1.0

# ---------------------------------------------------------------------------
# Display
# ---------------------------------------------------------------------------
[display]
# How filtered images are labelled in history listings:
#   generic      -> "Edited image"
#   filter-name  -> the applied filter's name, e.g. "Sepia"
label = "generic"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch mode.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
