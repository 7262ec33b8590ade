//! Bake configuration, loadable from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::{OutputFormat, PngLayout, SaveOptions};
use crate::geometry::{GridError, MeshExtent, TileGridConfig};
use crate::noise::NoiseSettings;
use crate::terrain::ExecutionMode;

/// Errors that can occur while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Noise size must be positive and finite, got {0}")]
    InvalidNoiseSize(f64),
    #[error("Falloff width must be within [0, 1], got {0}")]
    InvalidFalloffWidth(f64),
}

/// Where and how output files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base path; suffixes such as `_x0_y0.png` are appended to it.
    pub outpath: PathBuf,
    pub format: OutputFormat,
    pub png_layout: PngLayout,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            outpath: PathBuf::from("./output/heightmap"),
            format: OutputFormat::Png,
            png_layout: PngLayout::Rgba,
        }
    }
}

impl OutputConfig {
    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            format: self.format,
            png_layout: self.png_layout,
        }
    }
}

/// Image size of the single-shot vertex resample bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
        }
    }
}

/// Complete configuration of a bake run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Sample tiles on the rayon thread pool.
    pub parallel: bool,
    pub grid: TileGridConfig,
    pub output: OutputConfig,
    /// Footprint of the baked plane.
    pub extent: MeshExtent,
    /// Noise parameters; absent means there is nothing to export.
    pub noise: Option<NoiseSettings>,
    pub resample: ResampleConfig,
}

impl BakeConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&text)
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        if self.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        }
    }

    /// Checks grid invariants and noise settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        if let Some(noise) = &self.noise {
            validate_noise(noise)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_noise(noise: &NoiseSettings) -> Result<(), ConfigError> {
    if !(noise.noise_size > 0.0 && noise.noise_size.is_finite()) {
        return Err(ConfigError::InvalidNoiseSize(noise.noise_size));
    }
    // A wider ramp would reach the edge shared with the next tile.
    let width = noise.fractal.falloff_width;
    if !(0.0..=1.0).contains(&width) {
        return Err(ConfigError::InvalidFalloffWidth(width));
    }
    Ok(())
}
