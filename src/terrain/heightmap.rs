//! Heightmap sample buffer.

use std::path::{Path, PathBuf};

use crate::export::{image_path, mosaic_path, tile_path, write_samples, ExportError, OutputFormat, SaveOptions};
use crate::geometry::{TileCursor, TileGridConfig};

/// Largest quantized sample value.
pub const QUANT_MAX: f64 = 65535.0;

/// Quantizes a normalized height to 16 bits.
pub fn quantize_sample(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) as f64 * QUANT_MAX).round() as u16
}

/// Decodes a 16-bit sample back to [0, 1].
pub fn dequantize_sample(value: u16) -> f64 {
    value as f64 / QUANT_MAX
}

/// A 2D buffer of normalized height samples.
///
/// Holds either one tile or a mosaic of tiles. In a mosaic, tile origins are
/// `cell - 1` samples apart so neighbours share their boundary samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: u32,
    height: u32,
    cell_width: u32,
    cell_height: u32,
    offset: (u32, u32),
    /// Samples in [0, 1], row-major.
    samples: Vec<f32>,
    clamped: usize,
}

impl Heightmap {
    /// Creates a zeroed `width × height` buffer with the given tile stride.
    pub fn new(width: u32, height: u32, cell_width: u32, cell_height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cell_width,
            cell_height,
            offset: (0, 0),
            samples: vec![0.0; size],
            clamped: 0,
        }
    }

    /// A buffer holding a single tile of `grid`.
    pub fn for_tile(grid: &TileGridConfig) -> Self {
        Self::new(grid.cell_width, grid.cell_height, grid.cell_width, grid.cell_height)
    }

    /// A buffer holding every tile of `grid` with shared boundaries.
    pub fn for_mosaic(grid: &TileGridConfig) -> Self {
        let (width, height) = grid.mosaic_size();
        Self::new(width, height, grid.cell_width, grid.cell_height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// True if the buffer is exactly one tile.
    pub fn is_single_cell(&self) -> bool {
        self.width == self.cell_width && self.height == self.cell_height
    }

    /// Moves the write offset to the origin of tile `(cell_x, cell_y)`.
    pub fn set_cell(&mut self, cell_x: u32, cell_y: u32) {
        self.offset = (
            self.cell_width.saturating_sub(1) * cell_x,
            self.cell_height.saturating_sub(1) * cell_y,
        );
    }

    /// Writes a sample at tile-local coordinates, clamped to [0, 1].
    ///
    /// Out-of-range values (NaN is stored as 0) are counted and reported when
    /// the buffer is saved.
    ///
    /// # Panics
    /// Panics if the translated coordinate is out of bounds.
    pub fn set(&mut self, local_x: u32, local_y: u32, value: f64) {
        let x = self.offset.0 + local_x;
        let y = self.offset.1 + local_y;
        assert!(
            x < self.width && y < self.height,
            "sample ({x}, {y}) outside {}x{} heightmap",
            self.width,
            self.height
        );

        let stored = if value.is_nan() {
            self.clamped += 1;
            0.0
        } else if !(0.0..=1.0).contains(&value) {
            self.clamped += 1;
            value.clamp(0.0, 1.0)
        } else {
            value
        };
        let i = self.index(x, y);
        self.samples[i] = stored as f32;
    }

    /// Returns the sample at absolute pixel coordinates.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.samples[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Row-major samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of writes that had to be clamped into [0, 1].
    pub fn clamped_count(&self) -> usize {
        self.clamped
    }

    /// Returns (min, max) over all samples.
    pub fn value_range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Copies the block of `tile` owned by `cursor` into this mosaic.
    ///
    /// `tile` must be a single-cell buffer of the same grid. Owned blocks of
    /// different tiles are disjoint.
    pub fn blit_owned(&mut self, cursor: TileCursor, grid: &TileGridConfig, tile: &Heightmap) {
        debug_assert!(tile.is_single_cell());
        let (ox, oy) = cursor.pixel_offset(grid);
        let (ow, oh) = cursor.owned_extent(grid);
        for ly in 0..oh {
            let src = tile.index(0, ly);
            let dst = self.index(ox, oy + ly);
            self.samples[dst..dst + ow as usize].copy_from_slice(&tile.samples[src..src + ow as usize]);
        }
        self.clamped += tile.clamped;
    }

    /// Quantizes every sample to `round(value * 65535)`, row-major.
    pub fn quantize(&self) -> Vec<u16> {
        self.samples.iter().map(|&v| quantize_sample(v)).collect()
    }

    /// Saves the buffer once and returns the written path.
    ///
    /// Without a cell the buffer is a mosaic and goes to `<outpath>.r16`
    /// regardless of `options.format`. With a cell it is an independent tile
    /// written to `<outpath>_x<N>_y<M>.<ext>`.
    pub fn save(
        &self,
        outpath: &Path,
        cell: Option<TileCursor>,
        options: &SaveOptions,
    ) -> Result<PathBuf, ExportError> {
        let (path, options) = match cell {
            None => (mosaic_path(outpath), SaveOptions::new(OutputFormat::Raw)),
            Some(cursor) => (tile_path(outpath, cursor, options.format), *options),
        };
        self.write_to(&path, &options)?;
        Ok(path)
    }

    /// Saves the buffer as a single `<outpath>.<ext>` image.
    pub fn save_image(&self, outpath: &Path, options: &SaveOptions) -> Result<PathBuf, ExportError> {
        let path = image_path(outpath, options.format);
        self.write_to(&path, options)?;
        Ok(path)
    }

    fn write_to(&self, path: &Path, options: &SaveOptions) -> Result<(), ExportError> {
        if self.clamped > 0 {
            log::warn!(
                "{}: {} sample writes were outside [0, 1] and were clamped",
                path.display(),
                self.clamped
            );
        }
        write_samples(path, self.width, self.height, &self.quantize(), options)?;
        let (lo, hi) = self.value_range();
        log::info!(
            "Wrote {}x{} heightmap to {} (range {:.4}..{:.4})",
            self.width,
            self.height,
            path.display(),
            lo,
            hi
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::read_r16;
    use tempfile::tempdir;

    #[test]
    fn test_new_is_zeroed() {
        let map = Heightmap::new(5, 3, 5, 3);
        assert_eq!(map.samples().len(), 15);
        assert!(map.samples().iter().all(|&v| v == 0.0));
        assert!(map.is_single_cell());
    }

    #[test]
    fn test_mosaic_size() {
        let grid = TileGridConfig::new(3, 2, 9, 17);
        let map = Heightmap::for_mosaic(&grid);
        assert_eq!(map.size(), (25, 33));
        assert_eq!(map.cell_size(), (9, 17));
        assert!(!map.is_single_cell());
    }

    #[test]
    fn test_set_cell_translates_writes() {
        let grid = TileGridConfig::new(2, 2, 3, 3);
        let mut map = Heightmap::for_mosaic(&grid);
        map.set_cell(1, 1);
        map.set(0, 0, 0.5);
        map.set(2, 2, 0.25);
        assert_eq!(map.get(2, 2), 0.5);
        assert_eq!(map.get(4, 4), 0.25);
    }

    #[test]
    fn test_set_clamps_and_counts() {
        let mut map = Heightmap::new(4, 1, 4, 1);
        map.set(0, 0, -0.5);
        map.set(1, 0, 1.5);
        map.set(2, 0, f64::NAN);
        map.set(3, 0, 0.75);
        assert_eq!(map.samples(), &[0.0, 1.0, 0.0, 0.75]);
        assert_eq!(map.clamped_count(), 3);
        assert_eq!(map.value_range(), (0.0, 1.0));
    }

    #[test]
    fn test_value_range() {
        let mut map = Heightmap::new(3, 1, 3, 1);
        map.set(0, 0, 0.25);
        map.set(1, 0, 0.5);
        map.set(2, 0, 0.375);
        assert_eq!(map.value_range(), (0.25, 0.5));
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_bounds_panics() {
        let mut map = Heightmap::new(2, 2, 2, 2);
        map.set(2, 0, 0.0);
    }

    #[test]
    fn test_quantize() {
        let mut map = Heightmap::new(3, 1, 3, 1);
        map.set(0, 0, 0.0);
        map.set(1, 0, 0.5);
        map.set(2, 0, 1.0);
        assert_eq!(map.quantize(), vec![0, 32768, 65535]);
    }

    #[test]
    fn test_quantization_round_trip() {
        for i in 0..=1000 {
            let v = i as f64 / 1000.0;
            let decoded = dequantize_sample(quantize_sample(v as f32));
            assert!((decoded - v).abs() <= 1.0 / 65535.0, "{v} decoded as {decoded}");
        }
    }

    #[test]
    fn test_blit_owned() {
        let grid = TileGridConfig::new(2, 1, 3, 2);
        let mut mosaic = Heightmap::for_mosaic(&grid);

        let mut left = Heightmap::for_tile(&grid);
        let mut right = Heightmap::for_tile(&grid);
        for y in 0..2 {
            for x in 0..3 {
                left.set(x, y, 0.25);
                right.set(x, y, 0.75);
            }
        }

        mosaic.blit_owned(TileCursor::new(0, 0), &grid, &left);
        mosaic.blit_owned(TileCursor::new(1, 0), &grid, &right);

        // Column 2 is shared and owned by the right tile.
        assert_eq!(mosaic.samples(), &[0.25, 0.25, 0.75, 0.75, 0.75, 0.25, 0.25, 0.75, 0.75, 0.75]);
    }

    #[test]
    fn test_save_mosaic_is_raw() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("land");
        let mut map = Heightmap::new(2, 2, 2, 2);
        map.set(1, 1, 1.0);

        let path = map.save(&out, None, &SaveOptions::new(OutputFormat::Png)).unwrap();

        assert_eq!(path, dir.path().join("land.r16"));
        assert_eq!(read_r16(&path).unwrap(), vec![0, 0, 0, 65535]);
    }

    #[test]
    fn test_save_tile_names() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("land");
        let map = Heightmap::new(2, 2, 2, 2);

        let png = map.save(&out, Some(TileCursor::new(1, 2)), &SaveOptions::new(OutputFormat::Png)).unwrap();
        let raw = map.save(&out, Some(TileCursor::new(1, 2)), &SaveOptions::new(OutputFormat::Raw)).unwrap();

        assert_eq!(png, dir.path().join("land_x1_y2.png"));
        assert_eq!(raw, dir.path().join("land_x1_y2.r16"));
        assert!(png.exists() && raw.exists());
    }
}
