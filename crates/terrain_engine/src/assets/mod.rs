//! Asset file access
//!
//! Decoding of image files and reading of shader sources. Everything here
//! is plain CPU work; uploads happen in `render`.

pub mod image_loader;

pub use image_loader::{ImageData, PixelLayout};

use std::path::Path;
use thiserror::Error;

/// Read a text asset (shader source) fully as UTF-8
pub fn read_text(path: impl AsRef<Path>) -> Result<String, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound(path.display().to_string())
        } else {
            AssetError::IoError(e)
        }
    })?;
    String::from_utf8(bytes)
        .map_err(|e| AssetError::InvalidData(format!("{} is not UTF-8: {}", path.display(), e)))
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to decode asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_reports_missing_file() {
        let result = read_text("no/such/shader.vert");
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn read_text_rejects_invalid_utf8() {
        let path = std::env::temp_dir().join("terrain_engine_assets_bad_utf8.frag");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let result = read_text(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(AssetError::InvalidData(_))));
    }

    #[test]
    fn read_text_returns_whole_file() {
        let path = std::env::temp_dir().join("terrain_engine_assets_ok.vert");
        std::fs::write(&path, "#version 450 core\nvoid main() {}\n").unwrap();
        let text = read_text(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.starts_with("#version 450"));
        assert!(text.ends_with("{}\n"));
    }
}
