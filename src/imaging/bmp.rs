//! BMP encoder: uncompressed, 24-bit, top-down.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! offset  size  field
//!      0     2  "BM"
//!      2     4  file size
//!      6     4  reserved (0)
//!     10     4  pixel data offset (54)
//!     14     4  info header size (40)
//!     18     4  width
//!     22     4  height, negative = first row is the top row
//!     26     2  planes (1)
//!     28     2  bits per pixel (24)
//!     30     4  compression (0 = none)
//!     34     4  pixel data size
//!     38     8  resolution, 2835 px/m (72 DPI) both axes
//!     46     8  palette colors, important colors (0)
//!     54        rows of B,G,R triples, each padded to 4 bytes with zeros
//! ```

use super::encoder::EncodeError;
use crate::bitmap::{Bitmap, CHANNELS};

/// File header (14) + BITMAPINFOHEADER (40).
pub const HEADER_SIZE: usize = 54;

const INFO_HEADER_SIZE: u32 = 40;
const PIXELS_PER_METER: u32 = 2835;

/// Bytes per stored row: 3 per pixel, rounded up to a multiple of 4.
pub fn row_stride(width: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(3)
        .and_then(|r| r.checked_add(3))
        .map(|r| r & !3)
}

/// Exact size of the encoded file, or `None` if it cannot be represented.
pub fn bmp_file_size(width: u32, height: u32) -> Option<usize> {
    row_stride(width)?
        .checked_mul(height as usize)?
        .checked_add(HEADER_SIZE)
        .filter(|&size| u32::try_from(size).is_ok())
}

/// Encode an RGBA bitmap as a 24-bit BMP. Alpha is dropped.
pub fn encode_bmp(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = bitmap.dimensions();
    let too_large = || EncodeError::TooLarge { width, height };

    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(too_large());
    }
    let stride = row_stride(width).ok_or_else(too_large)?;
    let file_size = bmp_file_size(width, height).ok_or_else(too_large)?;
    let pixel_data_size = file_size - HEADER_SIZE;

    let mut out = Vec::with_capacity(file_size);
    write_header(&mut out, file_size as u32, pixel_data_size as u32, width, height);

    let w = width as usize;
    let pad = stride - w * 3;
    if w > 0 {
        for row in bitmap.pixels().chunks_exact(w * CHANNELS) {
            for px in row.chunks_exact(CHANNELS) {
                out.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            out.extend(std::iter::repeat_n(0u8, pad));
        }
    }

    debug_assert_eq!(out.len(), file_size);
    Ok(out)
}

fn write_header(out: &mut Vec<u8>, file_size: u32, pixel_data_size: u32, width: u32, height: u32) {
    // File header (14 bytes)
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&(HEADER_SIZE as u32).to_le_bytes());

    // BITMAPINFOHEADER (40 bytes)
    out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(-(height as i32)).to_le_bytes()); // top-down
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&pixel_data_size.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    fn i32_at(buf: &[u8], at: usize) -> i32 {
        i32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
    }

    /// Red, green on the top row; blue, white on the bottom row.
    fn two_by_two() -> Bitmap {
        Bitmap::from_rgba(
            2,
            2,
            vec![
                255, 0, 0, 255, 0, 255, 0, 128, //
                0, 0, 255, 0, 255, 255, 255, 255,
            ],
        )
        .unwrap()
    }

    #[test]
    fn row_stride_pads_to_four() {
        assert_eq!(row_stride(1), Some(4));
        assert_eq!(row_stride(2), Some(8));
        assert_eq!(row_stride(3), Some(12));
        assert_eq!(row_stride(4), Some(12));
        assert_eq!(row_stride(5), Some(16));
        assert_eq!(row_stride(0), Some(0));
    }

    #[test]
    fn two_by_two_header_fields() {
        let file = encode_bmp(&two_by_two()).unwrap();
        assert_eq!(file.len(), 54 + 2 * 8);
        assert_eq!(&file[0..2], b"BM");
        assert_eq!(u32_at(&file, 2), 70);
        assert_eq!(u32_at(&file, 6), 0);
        assert_eq!(u32_at(&file, 10), 54);
        assert_eq!(u32_at(&file, 14), 40);
        assert_eq!(i32_at(&file, 18), 2);
        assert_eq!(i32_at(&file, 22), -2);
        assert_eq!(u16_at(&file, 26), 1);
        assert_eq!(u16_at(&file, 28), 24);
        assert_eq!(u32_at(&file, 30), 0);
        assert_eq!(u32_at(&file, 34), 16);
        assert_eq!(u32_at(&file, 38), 2835);
        assert_eq!(u32_at(&file, 42), 2835);
        assert_eq!(u32_at(&file, 46), 0);
        assert_eq!(u32_at(&file, 50), 0);
    }

    #[test]
    fn two_by_two_pixels_are_bgr_top_down_and_padded() {
        let file = encode_bmp(&two_by_two()).unwrap();
        assert_eq!(
            &file[54..],
            &[
                0, 0, 255, 0, 255, 0, 0, 0, // red, green, 2 pad bytes
                255, 0, 0, 255, 255, 255, 0, 0, // blue, white, 2 pad bytes
            ]
        );
    }

    #[test]
    fn width_multiple_of_four_has_no_padding() {
        let bmp = Bitmap::filled(4, 3, [1, 2, 3, 4]).unwrap();
        let file = encode_bmp(&bmp).unwrap();
        assert_eq!(file.len(), 54 + 12 * 3);
        assert_eq!(&file[54..57], &[3, 2, 1]);
    }

    #[test]
    fn empty_bitmap_is_header_only() {
        let bmp = Bitmap::from_rgba(0, 0, Vec::new()).unwrap();
        let file = encode_bmp(&bmp).unwrap();
        assert_eq!(file.len(), 54);
        assert_eq!(u32_at(&file, 34), 0);
    }

    #[test]
    fn file_size_matches_encoder() {
        for (w, h) in [(1, 1), (3, 5), (7, 2), (16, 16)] {
            let bmp = Bitmap::filled(w, h, [9, 9, 9, 9]).unwrap();
            assert_eq!(Some(encode_bmp(&bmp).unwrap().len()), bmp_file_size(w, h));
        }
    }

    #[test]
    fn file_size_rejects_overflow() {
        assert_eq!(bmp_file_size(100_000, 100_000), None);
    }
}
