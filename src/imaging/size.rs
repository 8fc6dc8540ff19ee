//! Encoded size estimation and human-readable byte counts.

use super::encoder::{EncodeError, ExportFormat, encode};
use super::params::Quality;
use crate::bitmap::Bitmap;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Encode `bitmap` and report the output length. Informational only; the
/// encoded bytes are discarded.
pub fn estimate_size(
    bitmap: &Bitmap,
    format: ExportFormat,
    quality: Quality,
) -> Result<usize, EncodeError> {
    Ok(encode(bitmap, format, quality)?.len())
}

/// Format a byte count with base-1024 units and at most two decimals.
///
/// # Examples
/// ```
/// # use retouch::imaging::format_bytes;
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1_048_576), "1 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = bytes as f64 / scale as f64;
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::bmp::bmp_file_size;

    #[test]
    fn format_zero() {
        assert_eq!(format_bytes(0), "0 Bytes");
    }

    #[test]
    fn format_below_one_kilobyte() {
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_100), "1.07 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn format_caps_at_terabytes() {
        let pb = 1024u64.pow(5);
        assert_eq!(format_bytes(pb), "1024 TB");
    }

    #[test]
    fn bmp_estimate_is_exact() {
        let bmp = Bitmap::filled(5, 3, [1, 2, 3, 255]).unwrap();
        let size = estimate_size(&bmp, ExportFormat::Bmp, Quality::default()).unwrap();
        assert_eq!(Some(size), bmp_file_size(5, 3));
    }

    #[test]
    fn png_estimate_is_nonzero() {
        let bmp = Bitmap::filled(8, 8, [10, 20, 30, 255]).unwrap();
        assert!(estimate_size(&bmp, ExportFormat::Png, Quality::default()).unwrap() > 0);
    }
}
