//! Continuous sampling domain of a mesh footprint.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Bounding dimensions of the sampled surface.
///
/// The domain is centred at the origin: `x ∈ [-size_x/2, size_x/2]` and
/// `y ∈ [-size_y/2, size_y/2]`. `z_max` is the vertical extent used to
/// normalize vertex heights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshExtent {
    /// Width of the footprint along X.
    pub size_x: f64,
    /// Depth of the footprint along Y.
    pub size_y: f64,
    /// Height of the bounding box along Z.
    pub z_max: f64,
}

impl Default for MeshExtent {
    fn default() -> Self {
        Self {
            size_x: 2.0,
            size_y: 2.0,
            z_max: 1.0,
        }
    }
}

impl MeshExtent {
    /// Creates an extent from explicit dimensions.
    pub fn new(size_x: f64, size_y: f64, z_max: f64) -> Self {
        Self { size_x, size_y, z_max }
    }

    /// Computes the axis-aligned bounding dimensions of a vertex set.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_vertices(vertices: &[DVec3]) -> Option<Self> {
        let first = *vertices.first()?;
        let (min, max) = vertices
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let size = max - min;
        Some(Self::new(size.x, size.y, size.z))
    }

    /// Returns true if both footprint axes have a positive, finite size.
    pub fn is_valid_footprint(&self) -> bool {
        self.size_x.is_finite() && self.size_y.is_finite() && self.size_x > 0.0 && self.size_y > 0.0
    }

    /// Lower corner of the footprint.
    pub fn origin(&self) -> (f64, f64) {
        (-self.size_x / 2.0, -self.size_y / 2.0)
    }

    /// Maps a local sample index to its continuous-domain coordinate.
    ///
    /// `samples` is the number of samples along that axis including both
    /// boundary samples, so index 0 lands on `-size/2` and index
    /// `samples - 1` lands on `+size/2`.
    pub fn sample_x(&self, index: u32, samples: u32) -> f64 {
        axis_coordinate(self.size_x, index, samples)
    }

    /// Y counterpart of [`MeshExtent::sample_x`].
    pub fn sample_y(&self, index: u32, samples: u32) -> f64 {
        axis_coordinate(self.size_y, index, samples)
    }

    /// Converts a continuous position to normalized tile coordinates in [-1, 1].
    pub fn to_unit(&self, x: f64, y: f64) -> (f64, f64) {
        (x / (self.size_x / 2.0), y / (self.size_y / 2.0))
    }
}

fn axis_coordinate(size: f64, index: u32, samples: u32) -> f64 {
    debug_assert!(samples >= 2);
    let step = size / (samples - 1) as f64;
    -size / 2.0 + index as f64 * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints() {
        let extent = MeshExtent::new(4.0, 2.0, 1.0);
        assert_eq!(extent.sample_x(0, 5), -2.0);
        assert_eq!(extent.sample_x(4, 5), 2.0);
        assert_eq!(extent.sample_x(2, 5), 0.0);
        assert_eq!(extent.sample_y(0, 3), -1.0);
        assert_eq!(extent.sample_y(2, 3), 1.0);
    }

    #[test]
    fn test_from_vertices() {
        let vertices = [
            DVec3::new(-1.0, -2.0, 0.0),
            DVec3::new(3.0, 2.0, 0.5),
            DVec3::new(0.0, 0.0, 1.5),
        ];
        let extent = MeshExtent::from_vertices(&vertices).unwrap();
        assert_eq!(extent, MeshExtent::new(4.0, 4.0, 1.5));
        assert!(MeshExtent::from_vertices(&[]).is_none());
    }

    #[test]
    fn test_to_unit() {
        let extent = MeshExtent::new(10.0, 4.0, 1.0);
        assert_eq!(extent.to_unit(5.0, -2.0), (1.0, -1.0));
        assert_eq!(extent.to_unit(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_invalid_footprint() {
        assert!(!MeshExtent::new(0.0, 1.0, 1.0).is_valid_footprint());
        assert!(!MeshExtent::new(f64::NAN, 1.0, 1.0).is_valid_footprint());
        assert!(MeshExtent::default().is_valid_footprint());
    }
}
