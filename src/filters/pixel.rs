//! Single-pass per-pixel operators.
//!
//! Every function here walks an RGBA buffer in 4-byte chunks and rewrites the
//! R, G, B channels in place. Alpha is never read or written. Results are
//! rounded and clamped to `[0, 255]`. A zero amount is an exact no-op.

use super::noise::NoiseSource;
use crate::bitmap::{CHANNELS, clamp_channel};
use crate::color::{hsl_to_rgb, luma, rgb_to_hsl};

/// Default luma cut-off for [`black_white`].
pub const BLACK_WHITE_THRESHOLD: f32 = 128.0;

/// Largest contrast amount accepted before the factor's denominator reaches zero.
const CONTRAST_LIMIT: f32 = 258.0;

/// Maximum noise spread in channel units at `amount = 100`.
const NOISE_SPAN: f32 = 80.0;

/// Sepia color matrix, rows are output R, G, B.
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Warm shift per unit of temperature: red, green, blue.
const WARM: [f32; 3] = [40.0, 20.0, -40.0];
/// Cool shift per unit of (negative) temperature. Green moves less than when warming.
const COOL: [f32; 3] = [40.0, 10.0, -40.0];

/// Apply `f` to the RGB triple of every pixel.
fn map_rgb(pixels: &mut [u8], mut f: impl FnMut(f32, f32, f32) -> (f32, f32, f32)) {
    for px in pixels.chunks_exact_mut(CHANNELS) {
        let (r, g, b) = f(px[0] as f32, px[1] as f32, px[2] as f32);
        px[0] = clamp_channel(r);
        px[1] = clamp_channel(g);
        px[2] = clamp_channel(b);
    }
}

/// Add `amount / 100 * 255` to every channel.
pub fn brightness(pixels: &mut [u8], amount: f32) {
    if amount == 0.0 {
        return;
    }
    let offset = amount / 100.0 * 255.0;
    map_rgb(pixels, |r, g, b| (r + offset, g + offset, b + offset));
}

/// Contrast factor for `amount`, with the amount held below the pole at 259.
pub fn contrast_factor(amount: f32) -> f32 {
    let amount = amount.clamp(-255.0, CONTRAST_LIMIT);
    259.0 * (amount + 255.0) / (255.0 * (259.0 - amount))
}

/// Stretch channels away from (or toward) mid-gray.
pub fn contrast(pixels: &mut [u8], amount: f32) {
    if amount == 0.0 {
        return;
    }
    let factor = contrast_factor(amount);
    let curve = |c: f32| factor * (c - 128.0) + 128.0;
    map_rgb(pixels, |r, g, b| (curve(r), curve(g), curve(b)));
}

/// Scale each channel's distance from the pixel's luma by `1 + amount / 100`.
pub fn saturation(pixels: &mut [u8], amount: f32) {
    if amount == 0.0 {
        return;
    }
    let sat = 1.0 + amount / 100.0;
    map_rgb(pixels, |r, g, b| {
        let y = luma(r, g, b);
        (y + sat * (r - y), y + sat * (g - y), y + sat * (b - y))
    });
}

/// Multiply every channel by `2^(amount / 50)`.
pub fn exposure(pixels: &mut [u8], amount: f32) {
    if amount == 0.0 {
        return;
    }
    let factor = 2f32.powf(amount / 50.0);
    map_rgb(pixels, |r, g, b| (r * factor, g * factor, b * factor));
}

/// Rotate every pixel's hue by `degrees` through HSL.
pub fn hue_rotate(pixels: &mut [u8], degrees: f32) {
    if degrees == 0.0 || !degrees.is_finite() {
        return;
    }
    for px in pixels.chunks_exact_mut(CHANNELS) {
        let (h, s, l) = rgb_to_hsl(px[0], px[1], px[2]);
        let (r, g, b) = hsl_to_rgb((h + degrees).rem_euclid(360.0), s, l);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}

/// Replace RGB with the rounded BT.709 luma.
pub fn grayscale(pixels: &mut [u8]) {
    map_rgb(pixels, |r, g, b| {
        let y = luma(r, g, b);
        (y, y, y)
    });
}

/// Pure black or white depending on whether luma reaches `threshold`.
pub fn black_white(pixels: &mut [u8], threshold: f32) {
    map_rgb(pixels, |r, g, b| {
        let v = if luma(r, g, b) >= threshold { 255.0 } else { 0.0 };
        (v, v, v)
    });
}

pub fn sepia(pixels: &mut [u8]) {
    map_rgb(pixels, |r, g, b| {
        let row = |m: [f32; 3]| m[0] * r + m[1] * g + m[2] * b;
        (row(SEPIA[0]), row(SEPIA[1]), row(SEPIA[2]))
    });
}

pub fn invert(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(CHANNELS) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

/// Warm (positive) or cool (negative) white-balance shift.
pub fn temperature(pixels: &mut [u8], amount: f32) {
    if amount == 0.0 {
        return;
    }
    let t = amount / 100.0;
    let [dr, dg, db] = if t > 0.0 {
        WARM.map(|k| k * t)
    } else {
        COOL.map(|k| k * t)
    };
    map_rgb(pixels, |r, g, b| (r + dr, g + dg, b + db));
}

/// Add independent uniform noise in `[-n/2, n/2]` per channel, `n = amount / 100 * 80`.
pub fn noise(pixels: &mut [u8], amount: f32, rng: &mut dyn NoiseSource) {
    if amount <= 0.0 {
        return;
    }
    let spread = amount / 100.0 * NOISE_SPAN;
    let mut jitter = || (rng.next_unit() - 0.5) * spread;
    map_rgb(pixels, |r, g, b| (r + jitter(), g + jitter(), b + jitter()));
}
