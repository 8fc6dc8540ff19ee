//! Shared bitmap fixtures for unit tests.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let src = gradient(8, 6);
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "src.png", &src);
//! ```

use crate::bitmap::Bitmap;
use std::path::{Path, PathBuf};

/// Opaque bitmap with red rising left to right and green top to bottom.
pub fn gradient(width: u32, height: u32) -> Bitmap {
    Bitmap::from_fn(width, height, |x, y| {
        [
            (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8,
            (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8,
            128,
            255,
        ]
    })
    .unwrap()
}

/// Black and white squares of `cell` pixels.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> Bitmap {
    Bitmap::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            [0, 0, 0, 255]
        } else {
            [255, 255, 255, 255]
        }
    })
    .unwrap()
}

/// Save `bitmap` as PNG under `dir` and return the path.
pub fn write_png(dir: &Path, name: &str, bitmap: &Bitmap) -> PathBuf {
    let path = dir.join(name);
    bitmap.as_image().unwrap().save(&path).unwrap();
    path
}
