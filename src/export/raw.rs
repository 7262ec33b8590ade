//! RAW16 heightmap files for terrain engine imports.
//!
//! A RAW16 file is a headerless, row-major array of little-endian `u16`
//! samples, `width * height` entries long.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sample count {actual} does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32, actual: usize },
    #[error("RAW16 file has odd length {0}")]
    OddLength(u64),
}

/// Writes quantized samples as a RAW16 little-endian file.
///
/// # Arguments
/// * `path` - Output file path
/// * `width` - Image width in samples
/// * `height` - Image height in samples
/// * `samples` - Row-major samples, `width * height` entries
pub fn write_r16(path: &Path, width: u32, height: u32, samples: &[u16]) -> Result<(), RawExportError> {
    let expected = width as usize * height as usize;
    if samples.len() != expected {
        return Err(RawExportError::SizeMismatch {
            width,
            height,
            actual: samples.len(),
        });
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for &value in samples {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a RAW16 little-endian file back into samples.
pub fn read_r16(path: &Path) -> Result<Vec<u16>, RawExportError> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes)?;
    if bytes.len() % 2 != 0 {
        return Err(RawExportError::OddLength(bytes.len() as u64));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Returns the expected file size of a RAW16 export.
pub fn expected_file_size(width: u32, height: u32) -> u64 {
    width as u64 * height as u64 * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_r16_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.r16");
        let samples = vec![0u16; 17 * 9];

        write_r16(&path, 17, 9, &samples).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), expected_file_size(17, 9));
    }

    #[test]
    fn test_raw_content_is_little_endian() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.r16");

        write_r16(&path, 2, 2, &[0, 0x1234, 0xABCD, 65535]).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data, vec![0x00, 0x00, 0x34, 0x12, 0xCD, 0xAB, 0xFF, 0xFF]);
        assert_eq!(read_r16(&path).unwrap(), vec![0, 0x1234, 0xABCD, 65535]);
    }

    #[test]
    fn test_size_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.r16");
        let result = write_r16(&path, 4, 4, &[0; 3]);
        assert!(matches!(result, Err(RawExportError::SizeMismatch { actual: 3, .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_odd_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.r16");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert!(matches!(read_r16(&path), Err(RawExportError::OddLength(3))));
    }
}
