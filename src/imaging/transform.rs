//! Geometry operations: resize, crop, rotate, flip.
//!
//! Every function takes a source bitmap by reference and returns a new one.
//! Requests that would produce an empty image (zero target size, crops that
//! consume the whole frame) return a copy of the input and log a warning.

use super::calculations::{crop_rect, halfway, needs_intermediate_step};
use super::params::{CropInsets, FlipAxis, Rotation};
use crate::bitmap::{Bitmap, CHANNELS};
use image::imageops::FilterType;
use log::{debug, warn};

/// Number of resampling steps [`resize`] allows for large downscales.
pub const DEFAULT_RESIZE_STEPS: u32 = 2;

/// Resize with the default step budget.
pub fn resize(source: &Bitmap, width: u32, height: u32) -> Bitmap {
    resize_with_steps(source, width, height, DEFAULT_RESIZE_STEPS)
}

/// Resize, going through the halfway size first when shrinking below half.
///
/// Single-step resampling of a large downscale aliases; halving first and
/// then resampling the rest keeps fine detail stable. With `steps` left, the
/// halfway resize itself may recurse.
pub fn resize_with_steps(source: &Bitmap, width: u32, height: u32, steps: u32) -> Bitmap {
    if width == 0 || height == 0 || source.is_empty() {
        warn!(
            "resize {}x{} -> {width}x{height} would be empty, keeping source",
            source.width(),
            source.height()
        );
        return source.clone();
    }
    if source.dimensions() == (width, height) {
        return source.clone();
    }

    if steps > 1 && needs_intermediate_step(source.dimensions(), (width, height)) {
        let (mid_w, mid_h) = halfway(source.width(), source.height());
        debug!(
            "resize {}x{} -> {width}x{height} via {mid_w}x{mid_h}",
            source.width(),
            source.height()
        );
        let mid = resize_with_steps(source, mid_w, mid_h, steps - 1);
        return resize_direct(&mid, width, height);
    }

    resize_direct(source, width, height)
}

/// One Lanczos3 resampling pass.
fn resize_direct(source: &Bitmap, width: u32, height: u32) -> Bitmap {
    match source.as_image() {
        Ok(view) => Bitmap::from_rgba_image(image::imageops::resize(
            &view,
            width,
            height,
            FilterType::Lanczos3,
        )),
        Err(e) => {
            warn!("resize skipped: {e}");
            source.clone()
        }
    }
}

/// Trim a percentage from each edge.
pub fn crop(source: &Bitmap, insets: &CropInsets) -> Bitmap {
    if insets.is_empty() {
        return source.clone();
    }
    let Some(rect) = crop_rect(source.width(), source.height(), insets) else {
        warn!(
            "crop {insets:?} leaves nothing of {}x{}, keeping source",
            source.width(),
            source.height()
        );
        return source.clone();
    };

    let row_bytes = rect.width as usize * CHANNELS;
    let mut pixels = Vec::with_capacity(row_bytes * rect.height as usize);
    for y in rect.y..rect.y + rect.height {
        let start = source.offset(rect.x, y);
        pixels.extend_from_slice(&source.pixels()[start..start + row_bytes]);
    }
    debug!(
        "crop {}x{} -> {}x{} at ({}, {})",
        source.width(),
        source.height(),
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );
    Bitmap::from_rgba(rect.width, rect.height, pixels).unwrap_or_else(|_| source.clone())
}

/// Rotate clockwise by a quarter-turn multiple.
///
/// Each destination pixel center is mapped back through the inverse rotation
/// about the image centers. Coordinates are doubled so the mapping stays in
/// integers and hits source pixel centers exactly.
pub fn rotate(source: &Bitmap, rotation: Rotation) -> Bitmap {
    if rotation == Rotation::None || source.is_empty() {
        return source.clone();
    }
    let (sw, sh) = (source.width() as i64, source.height() as i64);
    let (dw, dh) = if rotation.swaps_dimensions() {
        (sh, sw)
    } else {
        (sw, sh)
    };
    let (cos, sin) = rotation.cos_sin();

    let src = source.pixels();
    let mut pixels = Vec::with_capacity(src.len());
    for dy in 0..dh {
        let v = 2 * dy + 1 - dh;
        for dx in 0..dw {
            let u = 2 * dx + 1 - dw;
            let sx = (u * cos + v * sin + sw - 1) / 2;
            let sy = (-u * sin + v * cos + sh - 1) / 2;
            let i = ((sy * sw + sx) as usize) * CHANNELS;
            pixels.extend_from_slice(&src[i..i + CHANNELS]);
        }
    }
    Bitmap::from_rgba(dw as u32, dh as u32, pixels).unwrap_or_else(|_| source.clone())
}

/// Rotate by a degree value. Anything that is not a multiple of 90 is ignored.
pub fn rotate_degrees(source: &Bitmap, degrees: i32) -> Bitmap {
    match Rotation::from_degrees(degrees) {
        Some(rotation) => rotate(source, rotation),
        None => {
            warn!("rotation by {degrees} degrees is not a quarter turn, keeping source");
            source.clone()
        }
    }
}

/// Mirror along `axis` into a new bitmap of the same size.
pub fn flip(source: &Bitmap, axis: FlipAxis) -> Bitmap {
    let (w, h) = (source.width() as usize, source.height() as usize);
    let row_bytes = w * CHANNELS;
    let src = source.pixels();
    let mut pixels = Vec::with_capacity(src.len());

    match axis {
        FlipAxis::Horizontal => {
            for row in src.chunks_exact(row_bytes.max(1)).take(h) {
                for px in row.chunks_exact(CHANNELS).rev() {
                    pixels.extend_from_slice(px);
                }
            }
        }
        FlipAxis::Vertical => {
            for row in src.chunks_exact(row_bytes.max(1)).take(h).rev() {
                pixels.extend_from_slice(row);
            }
        }
    }
    Bitmap::from_rgba(source.width(), source.height(), pixels).unwrap_or_else(|_| source.clone())
}
