//! Bake orchestration.
//!
//! A [`BakeJob`] checks the selection, sweeps the tile grid with a height
//! source and persists the result according to a [`BakeConfig`].

mod bake;
mod config;

pub use bake::{BakeError, BakeJob, BakeOutcome};
pub use config::{BakeConfig, ConfigError, OutputConfig, ResampleConfig};
