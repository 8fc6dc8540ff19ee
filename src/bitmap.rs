//! The [`Bitmap`] value type shared by every stage.
//!
//! A bitmap is `width × height` pixels stored row-major as R, G, B, A bytes
//! with no row padding. The constructor checks the buffer length once, so
//! operators can index freely without re-validating.

use thiserror::Error;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BitmapError {
    #[error("buffer size mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("dimensions too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

/// Borrowed `image` crate view over a bitmap's pixels.
pub type ImageView<'a> = image::ImageBuffer<image::Rgba<u8>, &'a [u8]>;

/// Owned RGBA8 image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Byte length of a `width × height` RGBA buffer, or `None` on overflow.
pub fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
}

impl Bitmap {
    /// Wrap an existing RGBA buffer. Fails unless `pixels.len() == width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        let expected = buffer_len(width, height).ok_or(BitmapError::TooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(BitmapError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BitmapError> {
        let len = buffer_len(width, height).ok_or(BitmapError::TooLarge { width, height })?;
        let pixels = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a bitmap by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> Result<Self, BitmapError> {
        let len = buffer_len(width, height).ok_or(BitmapError::TooLarge { width, height })?;
        let mut pixels = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Byte offset of pixel `(x, y)`. Caller guarantees the coordinate is in bounds.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        let px = &self.pixels[i..i + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Borrow the pixels as an `image` crate buffer for resampling and saving.
    pub fn as_image(&self) -> Result<ImageView<'_>, BitmapError> {
        let pixels: &[u8] = &self.pixels;
        image::ImageBuffer::from_raw(self.width, self.height, pixels).ok_or(
            BitmapError::SizeMismatch {
                width: self.width,
                height: self.height,
                expected: buffer_len(self.width, self.height).unwrap_or(usize::MAX),
                actual: self.pixels.len(),
            },
        )
    }

    /// Take ownership of an `image` crate buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

/// Clamp a floating-point channel value to a byte, rounding to nearest.
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_accepts_exact_length() {
        let bmp = Bitmap::from_rgba(2, 3, vec![0; 24]).unwrap();
        assert_eq!(bmp.dimensions(), (2, 3));
        assert_eq!(bmp.pixels().len(), 24);
    }

    #[test]
    fn from_rgba_rejects_short_buffer() {
        let err = Bitmap::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            BitmapError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn zero_sized_bitmap_is_empty() {
        let bmp = Bitmap::from_rgba(0, 5, Vec::new()).unwrap();
        assert!(bmp.is_empty());
    }

    #[test]
    fn filled_repeats_color() {
        let bmp = Bitmap::filled(3, 1, [1, 2, 3, 4]).unwrap();
        assert_eq!(bmp.pixels(), &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn from_fn_is_row_major() {
        let bmp = Bitmap::from_fn(2, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        assert_eq!(bmp.pixel(1, 0), Some([1, 0, 0, 255]));
        assert_eq!(bmp.pixel(0, 1), Some([0, 1, 0, 255]));
        assert_eq!(bmp.pixel(2, 0), None);
    }

    #[test]
    fn image_crate_conversion_preserves_bytes() {
        let bmp = Bitmap::from_fn(4, 3, |x, y| [x as u8 * 10, y as u8 * 20, 7, 200]).unwrap();
        let view = bmp.as_image().unwrap();
        assert_eq!(view.dimensions(), (4, 3));
        assert_eq!(view.get_pixel(3, 2).0, [30, 40, 7, 200]);

        let owned = image::RgbaImage::from_fn(4, 3, |x, y| *view.get_pixel(x, y));
        assert_eq!(Bitmap::from_rgba_image(owned), bmp);
    }

    #[test]
    fn image_view_borrows_without_copying() {
        let bmp = Bitmap::filled(2, 2, [9, 8, 7, 6]).unwrap();
        let view = bmp.as_image().unwrap();
        assert_eq!(view.as_raw().as_ptr(), bmp.pixels().as_ptr());
    }

    #[test]
    fn clamp_channel_rounds_and_saturates() {
        assert_eq!(clamp_channel(-4.0), 0);
        assert_eq!(clamp_channel(12.4), 12);
        assert_eq!(clamp_channel(12.6), 13);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(f32::NAN), 0);
    }
}
