//! Height source capability and the per-tile parameters passed to it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{EdgeFalloffTag, FractalNoiseConfig};
use crate::geometry::{MeshExtent, TileCursor};

/// Anything that can answer "how high is the terrain here".
///
/// Implementations must be pure given `(position, params)`: tiles may be
/// sampled concurrently, each with its own parameter value.
pub trait HeightSource: Sync {
    /// Height at `position` (z is ignored by planar sources).
    ///
    /// Values are nominally in [0, 1]; anything outside is clamped by the
    /// heightmap buffer.
    fn height(&self, position: DVec3, params: &NoiseParameters) -> f64;
}

impl<F> HeightSource for F
where
    F: Fn(DVec3, &NoiseParameters) -> f64 + Sync,
{
    fn height(&self, position: DVec3, params: &NoiseParameters) -> f64 {
        self(position, params)
    }
}

/// Per-tile inputs of a height source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameters {
    /// Noise-space X offset of the tile.
    pub noise_offset_x: f64,
    /// Noise-space Y offset of the tile.
    pub noise_offset_y: f64,
    /// Domain units per noise unit.
    pub noise_size: f64,
    /// Falloff applied to this tile.
    pub edge_falloff_tag: EdgeFalloffTag,
    /// Continuous domain of a single tile.
    pub extent: MeshExtent,
}

impl NoiseParameters {
    /// Maps a domain position of this tile into noise space.
    ///
    /// Adjacent tiles map their shared boundary to the same noise coordinate.
    pub fn noise_coordinate(&self, position: DVec3) -> (f64, f64) {
        (
            position.x / self.noise_size + self.noise_offset_x,
            position.y / self.noise_size + self.noise_offset_y,
        )
    }
}

/// Noise settings attached to the baked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Noise-space offset of tile (0, 0) along X.
    pub base_offset_x: f64,
    /// Noise-space offset of tile (0, 0) along Y.
    pub base_offset_y: f64,
    /// Domain units per noise unit; the per-tile step is `extent / noise_size`.
    pub noise_size: f64,
    /// Fractal backend configuration.
    pub fractal: FractalNoiseConfig,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            base_offset_x: 0.0,
            base_offset_y: 0.0,
            noise_size: 1.0,
            fractal: FractalNoiseConfig::default(),
        }
    }
}

impl NoiseSettings {
    /// Noise-space distance between the origins of adjacent tiles.
    pub fn tile_noise_step(&self, extent: &MeshExtent) -> (f64, f64) {
        (extent.size_x / self.noise_size, extent.size_y / self.noise_size)
    }

    /// Resolves the parameters of one tile from its grid position alone.
    pub fn tile_parameters(
        &self,
        cursor: TileCursor,
        extent: &MeshExtent,
        edge_falloff_tag: EdgeFalloffTag,
    ) -> NoiseParameters {
        let (step_x, step_y) = self.tile_noise_step(extent);
        NoiseParameters {
            noise_offset_x: self.base_offset_x + cursor.cell_x as f64 * step_x,
            noise_offset_y: self.base_offset_y + cursor.cell_y as f64 * step_y,
            noise_size: self.noise_size,
            edge_falloff_tag,
            extent: *extent,
        }
    }
}
