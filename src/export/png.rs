//! 16-bit PNG export for heightmap tiles.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Sample count {actual} does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32, actual: usize },
}

/// Channel layout of an exported PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngLayout {
    /// Height replicated into R, G and B with an opaque alpha channel.
    #[default]
    Rgba,
    /// Single 16-bit grey channel.
    Luma,
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    pub layout: PngLayout,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            layout: PngLayout::Rgba,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    pub fn with_layout(layout: PngLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }
}

/// Writes quantized samples as a 16-bit PNG.
///
/// # Arguments
/// * `path` - Output file path
/// * `width` - Image width in samples
/// * `height` - Image height in samples
/// * `samples` - Row-major samples, `width * height` entries
/// * `options` - Channel layout and encoder settings
pub fn write_png16(
    path: &Path,
    width: u32,
    height: u32,
    samples: &[u16],
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let expected = width as usize * height as usize;
    if samples.len() != expected {
        return Err(PngExportError::SizeMismatch {
            width,
            height,
            actual: samples.len(),
        });
    }

    let (pixels, color_type) = match options.layout {
        PngLayout::Luma => (samples.to_vec(), image::ExtendedColorType::L16),
        PngLayout::Rgba => {
            let pixels = samples
                .iter()
                .flat_map(|&v| [v, v, v, u16::MAX])
                .collect::<Vec<u16>>();
            (pixels, image::ExtendedColorType::Rgba16)
        }
    };

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // The encoder takes native-endian u16 bytes and swaps to PNG's big-endian.
    let byte_slice: &[u8] = bytemuck::cast_slice(&pixels);
    encoder.write_image(byte_slice, width, height, color_type)?;

    Ok(())
}
