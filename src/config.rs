//! Resize configuration.
//!
//! Handles loading, validating, and merging `photo-resize.toml`. Stock
//! defaults are the base layer; a user file overrides only the keys it
//! names, and command-line flags override both.
//!
//! ## Config File Location
//!
//! `photo-resize` looks for `photo-resize.toml` in the working directory,
//! or reads the file given with `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! quality = 100             # JPEG quality (1-100)
//! keep_metadata = true      # Copy allowlisted EXIF tags into JPEG output
//!
//! [resampling]
//! filter = "lanczos3"       # See `photo-resize filters`
//! presubsample = true       # Reduce by powers of two at decode when shrinking far
//! parallel = true           # Split destination rows into bands across threads
//! widen_on_downscale = false # Stretch kernels over the source footprint when shrinking
//!
//! [processing]
//! max_processes = 4         # Max worker threads (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ResizeFilter, ResizeParams, ResizeRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "photo-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resize configuration loaded from `photo-resize.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Encoding settings.
    pub output: OutputConfig,
    /// Filter choice and resampler switches.
    pub resampling: ResamplingConfig,
    /// Thread pool settings.
    pub processing: ProcessingConfig,
}

impl ResizeConfig {
    /// Validate semantic constraints that serde can't enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(format!(
                "output.quality must be 1-100, got {}",
                self.output.quality
            )));
        }
        self.filter()?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The configured filter, parsed.
    pub fn filter(&self) -> Result<ResizeFilter, ConfigError> {
        self.resampling
            .filter
            .parse()
            .map_err(|e| ConfigError::Validation(format!("resampling.filter: {e}")))
    }

    /// Build resize parameters for `source` from these settings.
    ///
    /// The output path defaults to `resized_<name>` next to the source.
    pub fn resize_params(
        &self,
        source: impl Into<PathBuf>,
        request: ResizeRequest,
    ) -> Result<ResizeParams, ConfigError> {
        let mut params = ResizeParams::new(source, request);
        params.filter = self.filter()?;
        params.quality = Quality::new(self.output.quality);
        params.keep_metadata = self.output.keep_metadata;
        params.presubsample = self.resampling.presubsample;
        params.parallel = self.resampling.parallel;
        params.widen_on_downscale = self.resampling.widen_on_downscale;
        Ok(params)
    }
}

/// Encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1 = worst, 100 = best). PNG and WebP are lossless.
    pub quality: u32,
    /// Copy allowlisted EXIF tags from the source into JPEG output.
    pub keep_metadata: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 100,
            keep_metadata: true,
        }
    }
}

/// Resampler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResamplingConfig {
    /// Filter name or alias, e.g. `"lanczos3"`, `"mitchell"`, `"naive"`.
    pub filter: String,
    /// Allow power-of-two reduction at decode time for large downscales.
    pub presubsample: bool,
    /// Resample destination row bands in parallel.
    pub parallel: bool,
    /// Stretch the kernel by the reduction ratio when downscaling. Off keeps
    /// every kernel at its native width.
    pub widen_on_downscale: bool,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default().name().to_string(),
            presubsample: true,
            parallel: true,
            widen_on_downscale: false,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads.
    /// When absent or null, defaults to the number of CPU cores.
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
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResizeConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit `path` must exist. Without one, [`CONFIG_FILE_NAME`] in the
/// working directory is used when present, stock defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ResizeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(CONFIG_FILE_NAME))?,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `photo-resize.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-resize Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the working directory as photo-resize.toml, or pass
# it explicitly with --config. Command-line flags override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG and WebP output is lossless.
quality = 100

# Copy allowlisted EXIF tags (camera, exposure, GPS, dates) into JPEG
# output. The orientation tag is always reset to 1 since pixels are
# written upright.
keep_metadata = true

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resampling]
# Filter used for the resize. Run `photo-resize filters` for the list.
# Common choices: "lanczos3" (sharp), "mitchell" (balanced),
# "cubic-bspline" (smooth), "point" (pixel art), "naive" (fast bilinear).
filter = "lanczos3"

# When shrinking by 2x or more, decode at a reduced power-of-two scale
# first. Much faster on large photos, slightly softer.
presubsample = true

# Split destination rows into bands and resample them on the thread pool.
# Output is identical to the sequential path.
parallel = true

# When shrinking, stretch the kernel by the reduction ratio so every
# destination pixel averages its whole source footprint. Off keeps the
# kernel at its native width (six taps for lanczos3), which is sharper but
# can alias on large reductions that presubsampling does not absorb.
widen_on_downscale = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum worker threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
