//! Tile grid layout and tile cursors.
//!
//! Adjacent tiles share one boundary row/column of samples, so the stride
//! between tile origins is `cell - 1` rather than `cell`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors describing an unusable tile grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Tile range must be at least 1x1, got {0}x{1}")]
    EmptyRange(u32, u32),
    #[error("Cell size must be at least 2x2 samples, got {0}x{1}")]
    CellTooSmall(u32, u32),
    #[error("Mosaic of {0}x{1} samples exceeds addressable size")]
    TooLarge(u64, u64),
}

/// Layout of the tile grid and export mode switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGridConfig {
    /// Number of tiles along X.
    pub range_x: u32,
    /// Number of tiles along Y.
    pub range_y: u32,
    /// Samples per tile edge along X, including the shared boundary.
    pub cell_width: u32,
    /// Samples per tile edge along Y, including the shared boundary.
    pub cell_height: u32,
    /// Taper the outer perimeter of the tile set.
    pub edge_falloff_active: bool,
    /// Assemble all tiles into one mosaic instead of one file per tile.
    pub single_heightmap: bool,
}

impl Default for TileGridConfig {
    fn default() -> Self {
        Self {
            range_x: 1,
            range_y: 1,
            cell_width: 257,
            cell_height: 257,
            edge_falloff_active: false,
            single_heightmap: false,
        }
    }
}

impl TileGridConfig {
    /// Creates a grid with falloff and mosaic mode disabled.
    pub fn new(range_x: u32, range_y: u32, cell_width: u32, cell_height: u32) -> Self {
        Self {
            range_x,
            range_y,
            cell_width,
            cell_height,
            ..Default::default()
        }
    }

    /// Checks the grid invariants.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.range_x < 1 || self.range_y < 1 {
            return Err(GridError::EmptyRange(self.range_x, self.range_y));
        }
        if self.cell_width < 2 || self.cell_height < 2 {
            return Err(GridError::CellTooSmall(self.cell_width, self.cell_height));
        }
        let width = (self.cell_width as u64 - 1) * self.range_x as u64 + 1;
        let height = (self.cell_height as u64 - 1) * self.range_y as u64 + 1;
        if width > u32::MAX as u64 || height > u32::MAX as u64 || width * height > usize::MAX as u64 {
            return Err(GridError::TooLarge(width, height));
        }
        Ok(())
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.range_x as usize * self.range_y as usize
    }

    /// Pixel extent of the assembled mosaic.
    pub fn mosaic_size(&self) -> (u32, u32) {
        (
            (self.cell_width - 1) * self.range_x + 1,
            (self.cell_height - 1) * self.range_y + 1,
        )
    }

    /// Every tile cursor, `cell_y` outer and `cell_x` inner.
    pub fn cursors(&self) -> impl Iterator<Item = TileCursor> + '_ {
        let range_x = self.range_x;
        (0..self.range_y).flat_map(move |cy| (0..range_x).map(move |cx| TileCursor::new(cx, cy)))
    }
}

/// Position of the active tile within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileCursor {
    pub cell_x: u32,
    pub cell_y: u32,
}

impl TileCursor {
    pub fn new(cell_x: u32, cell_y: u32) -> Self {
        Self { cell_x, cell_y }
    }

    /// Offset of the tile's first sample inside the mosaic.
    pub fn pixel_offset(&self, grid: &TileGridConfig) -> (u32, u32) {
        (
            (grid.cell_width - 1) * self.cell_x,
            (grid.cell_height - 1) * self.cell_y,
        )
    }

    /// Number of local columns and rows this tile owns in a mosaic.
    ///
    /// The shared far edge belongs to the next tile, except on the last tile
    /// of each axis. Owned blocks never overlap and cover the whole mosaic.
    pub fn owned_extent(&self, grid: &TileGridConfig) -> (u32, u32) {
        let w = if self.cell_x + 1 == grid.range_x {
            grid.cell_width
        } else {
            grid.cell_width - 1
        };
        let h = if self.cell_y + 1 == grid.range_y {
            grid.cell_height
        } else {
            grid.cell_height - 1
        };
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mosaic_sizing_law() {
        for range_x in 1..5 {
            for range_y in 1..5 {
                let grid = TileGridConfig::new(range_x, range_y, 9, 5);
                let (w, h) = grid.mosaic_size();
                assert_eq!(w, 8 * range_x + 1);
                assert_eq!(h, 4 * range_y + 1);
            }
        }
    }

    #[test]
    fn test_validate() {
        assert!(TileGridConfig::new(2, 2, 2, 2).validate().is_ok());
        assert_eq!(
            TileGridConfig::new(0, 2, 4, 4).validate(),
            Err(GridError::EmptyRange(0, 2))
        );
        assert_eq!(
            TileGridConfig::new(1, 1, 1, 4).validate(),
            Err(GridError::CellTooSmall(1, 4))
        );
    }

    #[test]
    fn test_cursor_order() {
        let grid = TileGridConfig::new(2, 2, 4, 4);
        let cursors: Vec<_> = grid.cursors().collect();
        assert_eq!(
            cursors,
            vec![
                TileCursor::new(0, 0),
                TileCursor::new(1, 0),
                TileCursor::new(0, 1),
                TileCursor::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_pixel_offset() {
        let grid = TileGridConfig::new(3, 3, 5, 7);
        assert_eq!(TileCursor::new(0, 0).pixel_offset(&grid), (0, 0));
        assert_eq!(TileCursor::new(2, 1).pixel_offset(&grid), (8, 6));
    }

    #[test]
    fn test_owned_blocks_partition_mosaic() {
        let grid = TileGridConfig::new(3, 2, 5, 4);
        let (w, h) = grid.mosaic_size();
        let mut hits = vec![0u32; (w * h) as usize];

        for cursor in grid.cursors() {
            let (ox, oy) = cursor.pixel_offset(&grid);
            let (ow, oh) = cursor.owned_extent(&grid);
            for ly in 0..oh {
                for lx in 0..ow {
                    hits[((oy + ly) * w + ox + lx) as usize] += 1;
                }
            }
        }

        assert!(hits.iter().all(|&n| n == 1), "owned blocks must cover each sample once");
    }
}
