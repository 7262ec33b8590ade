//! Output file naming and format dispatch.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::png::{write_png16, PngExportError, PngExportOptions, PngLayout};
use super::raw::{write_r16, RawExportError};
use crate::geometry::TileCursor;

/// Errors surfaced by any heightmap save.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create output directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("RAW export to {0} failed: {1}")]
    Raw(PathBuf, RawExportError),
    #[error("PNG export to {0} failed: {1}")]
    Png(PathBuf, PngExportError),
}

/// File format of saved heightmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit PNG, encoded through the `image` crate.
    #[default]
    Png,
    /// Headerless little-endian RAW16.
    Raw,
}

impl OutputFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Raw => "r16",
        }
    }
}

/// How a heightmap is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    pub format: OutputFormat,
    pub png_layout: PngLayout,
}

impl SaveOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }
}

/// Appends `suffix` to the final component of `outpath`.
fn with_suffix(outpath: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = outpath.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// `<outpath>.r16`, the combined mosaic file.
pub fn mosaic_path(outpath: &Path) -> PathBuf {
    with_suffix(outpath, ".r16")
}

/// `<outpath>_x<N>_y<M>.<ext>`, one independent tile.
pub fn tile_path(outpath: &Path, cursor: TileCursor, format: OutputFormat) -> PathBuf {
    with_suffix(
        outpath,
        &format!("_x{}_y{}.{}", cursor.cell_x, cursor.cell_y, format.extension()),
    )
}

/// `<outpath>.<ext>`, a single image in the chosen format.
pub fn image_path(outpath: &Path, format: OutputFormat) -> PathBuf {
    with_suffix(outpath, &format!(".{}", format.extension()))
}

/// Writes quantized samples to `path` in `format`, creating parent directories.
pub fn write_samples(
    path: &Path,
    width: u32,
    height: u32,
    samples: &[u16],
    options: &SaveOptions,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::CreateDir(parent.to_path_buf(), e))?;
    }

    match options.format {
        OutputFormat::Raw => write_r16(path, width, height, samples)
            .map_err(|e| ExportError::Raw(path.to_path_buf(), e)),
        OutputFormat::Png => {
            let png = PngExportOptions::with_layout(options.png_layout);
            write_png16(path, width, height, samples, &png)
                .map_err(|e| ExportError::Png(path.to_path_buf(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tile_naming() {
        let out = Path::new("out/terrain");
        assert_eq!(
            tile_path(out, TileCursor::new(1, 0), OutputFormat::Png),
            PathBuf::from("out/terrain_x1_y0.png")
        );
        assert_eq!(
            tile_path(out, TileCursor::new(3, 12), OutputFormat::Raw),
            PathBuf::from("out/terrain_x3_y12.r16")
        );
    }

    #[test]
    fn test_mosaic_and_image_naming() {
        let out = Path::new("/tmp/land");
        assert_eq!(mosaic_path(out), PathBuf::from("/tmp/land.r16"));
        assert_eq!(image_path(out, OutputFormat::Png), PathBuf::from("/tmp/land.png"));
    }

    #[test]
    fn test_write_samples_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/map.r16");

        write_samples(&path, 2, 1, &[1, 2], &SaveOptions::new(OutputFormat::Raw)).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 0, 2, 0]);
    }

    #[test]
    fn test_write_samples_reports_path() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes File::create fail.
        let path = dir.path().join("blocked.r16");
        std::fs::create_dir(&path).unwrap();

        let err = write_samples(&path, 1, 1, &[0], &SaveOptions::new(OutputFormat::Raw)).unwrap_err();
        match err {
            ExportError::Raw(p, RawExportError::Io(_)) => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
