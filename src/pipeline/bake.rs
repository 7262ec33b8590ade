//! Bake runs: precondition checks, tile sweep, and persistence.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use super::config::{validate_noise, BakeConfig, ConfigError};
use crate::export::ExportError;
use crate::geometry::{Mesh, SceneObject, TileCursor};
use crate::noise::{FractalHeightSource, HeightSource};
use crate::terrain::{resample_vertices, GridSampler, ResampleError, SamplingStrategy};

/// Errors that abort a bake run.
///
/// Files written before the failure are left on disk.
#[derive(Error, Debug)]
pub enum BakeError {
    #[error("No object selected")]
    NoActiveSelection,
    #[error("{name} is not a mesh (found {kind})")]
    UnsupportedGeometryType { name: String, kind: String },
    #[error("Mesh footprint {0}x{1} has no area")]
    InvalidExtent(f64, f64),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resample(#[from] ResampleError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BakeOutcome {
    /// Nothing was sampled or written.
    Skipped { reason: String },
    /// One combined RAW16 mosaic.
    Mosaic { path: PathBuf, width: u32, height: u32 },
    /// One file per tile, in cursor order.
    Tiles { paths: Vec<PathBuf> },
    /// A single image resampled from mesh vertices.
    Image { path: PathBuf, width: u32, height: u32 },
}

impl BakeOutcome {
    /// Paths of every file written.
    pub fn files(&self) -> Vec<&PathBuf> {
        match self {
            BakeOutcome::Skipped { .. } => Vec::new(),
            BakeOutcome::Mosaic { path, .. } | BakeOutcome::Image { path, .. } => vec![path],
            BakeOutcome::Tiles { paths } => paths.iter().collect(),
        }
    }

    /// Strategy that produced the heights, if any were produced.
    pub fn strategy(&self) -> Option<SamplingStrategy> {
        match self {
            BakeOutcome::Skipped { .. } => None,
            BakeOutcome::Mosaic { .. } | BakeOutcome::Tiles { .. } => Some(SamplingStrategy::Callback),
            BakeOutcome::Image { .. } => Some(SamplingStrategy::VertexResample),
        }
    }
}

/// Checks that the selection is a mesh object.
fn require_mesh(selection: Option<&SceneObject>) -> Result<(&SceneObject, &Mesh), BakeError> {
    let object = selection.ok_or(BakeError::NoActiveSelection)?;
    let mesh = object.mesh().ok_or_else(|| BakeError::UnsupportedGeometryType {
        name: object.name.clone(),
        kind: object.kind.type_name().to_string(),
    })?;
    Ok((object, mesh))
}

/// A bake run over one configuration.
pub struct BakeJob<'a> {
    config: &'a BakeConfig,
}

impl<'a> BakeJob<'a> {
    pub fn new(config: &'a BakeConfig) -> Self {
        Self { config }
    }

    /// Samples `source` over the selection's tile grid and saves the result.
    pub fn run<S: HeightSource + ?Sized>(
        &self,
        selection: Option<&SceneObject>,
        source: &S,
    ) -> Result<BakeOutcome, BakeError> {
        self.run_with_progress(selection, source, |_, _, _| {})
    }

    /// Runs with the object's own fractal noise settings as the height source.
    pub fn run_fractal(&self, selection: Option<&SceneObject>) -> Result<BakeOutcome, BakeError> {
        let source = selection
            .and_then(|object| object.noise.as_ref())
            .map(|noise| FractalHeightSource::new(noise.fractal.clone()))
            .unwrap_or_default();
        self.run(selection, &source)
    }

    /// Like [`BakeJob::run`], calling `on_tile(cursor, completed, total)` as
    /// each tile finishes.
    ///
    /// In parallel mode `on_tile` is called from worker threads, in
    /// completion order.
    pub fn run_with_progress<S, F>(
        &self,
        selection: Option<&SceneObject>,
        source: &S,
        on_tile: F,
    ) -> Result<BakeOutcome, BakeError>
    where
        S: HeightSource + ?Sized,
        F: Fn(TileCursor, usize, usize) + Sync,
    {
        let (object, _) = require_mesh(selection)?;
        let grid = self.config.grid;
        grid.validate().map_err(ConfigError::from)?;

        let Some(settings) = object.noise.as_ref() else {
            let reason = format!("{} has no noise parameters; nothing to export", object.name);
            log::warn!("{}", reason);
            return Ok(BakeOutcome::Skipped { reason });
        };
        validate_noise(settings)?;

        let extent = object.dimensions;
        if !extent.is_valid_footprint() {
            return Err(BakeError::InvalidExtent(extent.size_x, extent.size_y));
        }

        let mode = self.config.execution_mode();
        let outpath = &self.config.output.outpath;
        let options = self.config.output.save_options();
        log::info!(
            "Baking {}: {}x{} tiles of {}x{} samples, {} mode, {:?}",
            object.name,
            grid.range_x,
            grid.range_y,
            grid.cell_width,
            grid.cell_height,
            if grid.single_heightmap { "mosaic" } else { "tile" },
            mode
        );

        let sampler = GridSampler::new(extent, grid, settings, source);
        let total = grid.tile_count();
        let completed = AtomicUsize::new(0);
        let progress = |cursor: TileCursor| {
            let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
            on_tile(cursor, n, total);
        };

        if grid.single_heightmap {
            let mosaic = sampler.sample_mosaic_with(mode, &progress);
            let path = mosaic.save(outpath, None, &options)?;
            Ok(BakeOutcome::Mosaic {
                path,
                width: mosaic.width(),
                height: mosaic.height(),
            })
        } else {
            let paths = sampler.map_tiles(mode, |cursor, tile| {
                let path = tile.save(outpath, Some(cursor), &options)?;
                progress(cursor);
                Ok::<_, BakeError>(path)
            })?;
            Ok(BakeOutcome::Tiles { paths })
        }
    }

    /// Single-shot bake of the selection's vertices into one image.
    pub fn resample(&self, selection: Option<&SceneObject>) -> Result<BakeOutcome, BakeError> {
        let (object, mesh) = require_mesh(selection)?;
        let size = self.config.resample;
        log::info!(
            "Resampling {} vertices of {} into {}x{}",
            mesh.vertices.len(),
            object.name,
            size.width,
            size.height
        );

        let map = resample_vertices(&mesh.vertices, &object.dimensions, size.width, size.height)?;
        let path = map.save_image(&self.config.output.outpath, &self.config.output.save_options())?;
        Ok(BakeOutcome::Image {
            path,
            width: map.width(),
            height: map.height(),
        })
    }
}
