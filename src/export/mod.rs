//! Export module for saving heightmaps to disk.
//!
//! Supports 16-bit PNG tiles and headerless RAW16 files for game engine
//! imports, plus the file naming scheme shared by tiles and mosaics.

mod layout;
mod png;
mod raw;

pub use layout::{
    image_path, mosaic_path, tile_path, write_samples,
    ExportError, OutputFormat, SaveOptions,
};
pub use png::{write_png16, PngExportError, PngExportOptions, PngLayout};
pub use raw::{expected_file_size, read_r16, write_r16, RawExportError};
