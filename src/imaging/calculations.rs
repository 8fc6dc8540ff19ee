//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any pixels.

use super::params::CropInsets;

/// Resolve export dimensions, preserving the aspect ratio for a missing side.
///
/// | `new_w` | `new_h` | Result |
/// |---|---|---|
/// | `Some` | `Some` | used as-is |
/// | `Some` | `None` | height derived and rounded |
/// | `None` | `Some` | width derived and rounded |
/// | `None` | `None` | original dimensions |
///
/// # Examples
/// ```
/// # use retouch::imaging::calc_aspect_ratio;
/// assert_eq!(calc_aspect_ratio(1000, 500, Some(200), None), (200, 100));
/// assert_eq!(calc_aspect_ratio(1000, 500, None, Some(250)), (500, 250));
/// assert_eq!(calc_aspect_ratio(1000, 500, None, None), (1000, 500));
/// ```
pub fn calc_aspect_ratio(
    orig_w: u32,
    orig_h: u32,
    new_w: Option<u32>,
    new_h: Option<u32>,
) -> (u32, u32) {
    let scaled = |value: u32, num: u32, den: u32| -> u32 {
        if den == 0 {
            return 0;
        }
        (value as f64 * num as f64 / den as f64).round() as u32
    };

    match (new_w, new_h) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled(w, orig_h, orig_w)),
        (None, Some(h)) => (scaled(h, orig_w, orig_h), h),
        (None, None) => (orig_w, orig_h),
    }
}

/// Source rectangle for a percentage crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the crop rectangle for `insets` on a `width × height` image.
///
/// ```text
/// sx = round(w * left / 100)      sw = round(w * (1 - left/100 - right/100))
/// sy = round(h * top / 100)       sh = round(h * (1 - top/100 - bottom/100))
/// ```
///
/// The size is then trimmed so the rectangle never leaves the image.
/// Returns `None` when either side would be empty.
pub fn crop_rect(width: u32, height: u32, insets: &CropInsets) -> Option<CropRect> {
    let (w, h) = (width as f64, height as f64);
    let (top, bottom) = (insets.top as f64 / 100.0, insets.bottom as f64 / 100.0);
    let (left, right) = (insets.left as f64 / 100.0, insets.right as f64 / 100.0);

    let sx = (w * left).round();
    let sy = (h * top).round();
    let sw = (w * (1.0 - left - right)).round();
    let sh = (h * (1.0 - top - bottom)).round();

    if !(sw > 0.0 && sh > 0.0) || !(sx >= 0.0 && sy >= 0.0) || sx >= w || sy >= h {
        return None;
    }

    let x = sx as u32;
    let y = sy as u32;
    Some(CropRect {
        x,
        y,
        width: (sw as u32).min(width - x),
        height: (sh as u32).min(height - y),
    })
}

/// Dimensions halfway between a source and nothing: each side halved, at least 1.
pub fn halfway(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(2).max(1), height.div_ceil(2).max(1))
}

/// Whether a resize from `source` to `target` is a large enough downscale to
/// go through an intermediate step: strictly less than half on both axes.
pub fn needs_intermediate_step(source: (u32, u32), target: (u32, u32)) -> bool {
    (target.0 as u64) * 2 < source.0 as u64 && (target.1 as u64) * 2 < source.1 as u64
}
