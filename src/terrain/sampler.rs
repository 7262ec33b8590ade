//! Grid sampling of a height source over tiles and mosaics.

use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::Heightmap;
use crate::geometry::{MeshExtent, TileCursor, TileGridConfig};
use crate::noise::{EdgeFalloffTag, HeightSource, NoiseParameters, NoiseSettings};

/// How the tile sweep is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One tile after another on the calling thread.
    #[default]
    Sequential,
    /// Tiles distributed over the rayon thread pool.
    Parallel,
}

/// Where heights come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Evaluate a [`HeightSource`] directly on the tile grid.
    Callback,
    /// Bin existing mesh vertices into an image (see [`super::resample_vertices`]).
    VertexResample,
}

/// Evaluates `source` over one tile and writes it into `heightmap`.
///
/// Local sample `(lx, ly)` maps to `x = -size_x/2 + lx * size_x/(cell_width-1)`
/// (likewise `y`). A mosaic buffer is first repositioned to the cursor's
/// tile; a single-cell buffer is written directly.
pub fn sample_tile<S: HeightSource + ?Sized>(
    extent: &MeshExtent,
    cursor: TileCursor,
    grid: &TileGridConfig,
    source: &S,
    params: &NoiseParameters,
    heightmap: &mut Heightmap,
) {
    if !heightmap.is_single_cell() {
        heightmap.set_cell(cursor.cell_x, cursor.cell_y);
    }

    for ly in 0..grid.cell_height {
        let y = extent.sample_y(ly, grid.cell_height);
        for lx in 0..grid.cell_width {
            let x = extent.sample_x(lx, grid.cell_width);
            let z = source.height(DVec3::new(x, y, 0.0), params);
            heightmap.set(lx, ly, z);
        }
    }
}

/// Sweeps a height source over every tile of a grid.
pub struct GridSampler<'a, S: HeightSource + ?Sized> {
    extent: MeshExtent,
    grid: TileGridConfig,
    settings: &'a NoiseSettings,
    source: &'a S,
}

impl<'a, S: HeightSource + ?Sized> GridSampler<'a, S> {
    /// `extent` is the continuous domain covered by one tile.
    pub fn new(extent: MeshExtent, grid: TileGridConfig, settings: &'a NoiseSettings, source: &'a S) -> Self {
        Self {
            extent,
            grid,
            settings,
            source,
        }
    }

    /// Falloff tag of a tile, `None` unless edge falloff is active.
    pub fn falloff_tag(&self, cursor: TileCursor) -> EdgeFalloffTag {
        if self.grid.edge_falloff_active {
            EdgeFalloffTag::for_tile(cursor.cell_x, cursor.cell_y, self.grid.range_x, self.grid.range_y)
        } else {
            EdgeFalloffTag::None
        }
    }

    /// Parameters of one tile, resolved from its position alone.
    pub fn tile_parameters(&self, cursor: TileCursor) -> NoiseParameters {
        self.settings
            .tile_parameters(cursor, &self.extent, self.falloff_tag(cursor))
    }

    /// Samples one tile into its own buffer.
    pub fn sample_tile(&self, cursor: TileCursor) -> Heightmap {
        let params = self.tile_parameters(cursor);
        log::debug!(
            "Sampling tile ({}, {}) offset=({:.4}, {:.4}) falloff={}",
            cursor.cell_x,
            cursor.cell_y,
            params.noise_offset_x,
            params.noise_offset_y,
            params.edge_falloff_tag
        );
        let mut tile = Heightmap::for_tile(&self.grid);
        sample_tile(&self.extent, cursor, &self.grid, self.source, &params, &mut tile);
        tile
    }

    /// Samples every tile into one mosaic.
    pub fn sample_mosaic(&self, mode: ExecutionMode) -> Heightmap {
        self.sample_mosaic_with(mode, |_| {})
    }

    /// Like [`GridSampler::sample_mosaic`], calling `on_tile` after each tile.
    ///
    /// Sequential mode writes every tile straight into the mosaic in cursor
    /// order, so shared boundaries end up holding the later tile's samples.
    /// Parallel mode samples tiles into private buffers and copies only each
    /// tile's owned block, which selects the same samples.
    pub fn sample_mosaic_with<F>(&self, mode: ExecutionMode, on_tile: F) -> Heightmap
    where
        F: Fn(TileCursor) + Sync,
    {
        let mut mosaic = Heightmap::for_mosaic(&self.grid);

        match mode {
            ExecutionMode::Sequential => {
                for cursor in self.grid.cursors() {
                    let params = self.tile_parameters(cursor);
                    sample_tile(&self.extent, cursor, &self.grid, self.source, &params, &mut mosaic);
                    on_tile(cursor);
                }
            }
            ExecutionMode::Parallel => {
                let cursors: Vec<TileCursor> = self.grid.cursors().collect();
                let tiles: Vec<(TileCursor, Heightmap)> = cursors
                    .into_par_iter()
                    .map(|cursor| {
                        let tile = self.sample_tile(cursor);
                        on_tile(cursor);
                        (cursor, tile)
                    })
                    .collect();
                for (cursor, tile) in &tiles {
                    mosaic.blit_owned(*cursor, &self.grid, tile);
                }
            }
        }

        mosaic
    }

    /// Samples every tile independently and hands it to `f`.
    ///
    /// Results come back in cursor order. The first error stops the sweep;
    /// tiles already handled are not undone.
    pub fn map_tiles<T, E, F>(&self, mode: ExecutionMode, f: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(TileCursor, Heightmap) -> Result<T, E> + Sync,
    {
        match mode {
            ExecutionMode::Sequential => self
                .grid
                .cursors()
                .map(|cursor| f(cursor, self.sample_tile(cursor)))
                .collect(),
            ExecutionMode::Parallel => {
                let cursors: Vec<TileCursor> = self.grid.cursors().collect();
                cursors
                    .into_par_iter()
                    .map(|cursor| f(cursor, self.sample_tile(cursor)))
                    .collect()
            }
        }
    }
}
