//! Vertex-driven resampling of an existing mesh into a heightmap.
//!
//! Vertices are binned into a grid one sample larger than the image in each
//! axis, then every pixel averages its four surrounding grid samples.

use glam::DVec3;
use thiserror::Error;

use super::Heightmap;
use crate::geometry::MeshExtent;

/// Errors that can occur during vertex resampling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResampleError {
    #[error("Image size must be at least 1x1, got {0}x{1}")]
    EmptyImage(u32, u32),
    #[error("Mesh footprint {0}x{1} has no area")]
    DegenerateFootprint(f64, f64),
    #[error("Mesh height {0} must be positive to normalize vertex heights")]
    InvalidHeightScale(f64),
}

/// Resamples mesh vertices into a `width × height` heightmap.
///
/// Vertex positions are taken relative to a footprint centred at the origin.
/// Image row 0 is `y = -size_y/2`, the same orientation as grid-sampled
/// tiles. Bin indices truncate, and later vertices overwrite earlier ones in the same
/// bin. Heights are `z / z_max`.
pub fn resample_vertices(
    vertices: &[DVec3],
    extent: &MeshExtent,
    width: u32,
    height: u32,
) -> Result<Heightmap, ResampleError> {
    if width == 0 || height == 0 {
        return Err(ResampleError::EmptyImage(width, height));
    }
    if !extent.is_valid_footprint() {
        return Err(ResampleError::DegenerateFootprint(extent.size_x, extent.size_y));
    }
    if !(extent.z_max > 0.0 && extent.z_max.is_finite()) {
        return Err(ResampleError::InvalidHeightScale(extent.z_max));
    }

    let grid_w = width as usize + 1;
    let grid_h = height as usize + 1;
    let mut grid = vec![0.0f64; grid_w * grid_h];
    let (x0, y0) = extent.origin();

    for v in vertices {
        let gx = (((v.x - x0) / extent.size_x) * width as f64) as i64;
        let gy = (((v.y - y0) / extent.size_y) * height as f64) as i64;
        let gx = gx.clamp(0, width as i64) as usize;
        let gy = gy.clamp(0, height as i64) as usize;
        grid[gy * grid_w + gx] = v.z / extent.z_max;
    }

    let mut map = Heightmap::new(width, height, width, height);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let p0 = grid[y * grid_w + x];
            let p1 = grid[(y + 1) * grid_w + x];
            let p2 = grid[y * grid_w + x + 1];
            let p3 = grid[(y + 1) * grid_w + x + 1];
            map.set(x as u32, y as u32, (p0 + p1 + p2 + p3) * 0.25);
        }
    }

    Ok(map)
}
