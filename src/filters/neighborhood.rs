//! Operators that read neighboring pixels: box blur, sharpening, vignette.
//!
//! Blur and sharpening read from a snapshot of the buffer and write into the
//! live buffer, so no pass ever observes its own output.

use crate::bitmap::{Bitmap, CHANNELS, clamp_channel};

/// Unsharp-mask kernel (center-weighted Laplacian).
const SHARPEN_KERNEL: [[f32; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Blend weight per unit of sharpness strength.
const SHARPEN_BLEND: f32 = 0.3;

/// Largest blur radius honored; anything above behaves like this.
const MAX_BLUR_RADIUS: u64 = u32::MAX as u64;

/// Separable box blur: a horizontal pass then a vertical pass, each averaging
/// `2 * round(radius) + 1` samples with edge-clamped indexing.
pub fn blur(bitmap: &mut Bitmap, radius: f32) {
    if !(radius > 0.0) || bitmap.is_empty() {
        return;
    }
    let r = (radius.round() as u64).min(MAX_BLUR_RADIUS);
    if r == 0 {
        return;
    }
    let (w, h) = (bitmap.width() as usize, bitmap.height() as usize);
    let row_bytes = w * CHANNELS;

    let snapshot = bitmap.pixels().to_vec();
    let out = bitmap.pixels_mut();
    for y in 0..h {
        blur_line(&snapshot, out, y * row_bytes, CHANNELS, w, r);
    }

    let snapshot = bitmap.pixels().to_vec();
    let out = bitmap.pixels_mut();
    for x in 0..w {
        blur_line(&snapshot, out, x * CHANNELS, row_bytes, h, r);
    }
}

/// Running-sum box filter over one row or column.
///
/// Samples live at `start + i * step` for `i in 0..len`. Neighbors past either
/// end repeat the edge sample, so the first window is summed as two edge runs
/// plus the in-range samples rather than sample by sample.
fn blur_line(src: &[u8], dst: &mut [u8], start: usize, step: usize, len: usize, r: u64) {
    let window = (2 * r + 1) as f64;
    let last = len as i64 - 1;
    let at = |i: i64, c: usize| -> u64 {
        let clamped = i.clamp(0, last) as usize;
        src[start + clamped * step + c] as u64
    };
    let r = r as i64;

    for c in 0..3 {
        let inside: u64 = (0..=r.min(last)).map(|k| at(k, c)).sum();
        let past_end = (r - last).max(0) as u64;
        let mut sum = r as u64 * at(0, c) + inside + past_end * at(last, c);
        for i in 0..=last {
            dst[start + i as usize * step + c] = clamp_channel((sum as f64 / window) as f32);
            sum += at(i + r + 1, c);
            sum -= at(i - r, c);
        }
    }
}

/// Unsharp masking with a fixed 3×3 kernel, blended by `strength * 0.3`.
///
/// Only interior pixels are filtered; the one-pixel border is left as-is.
pub fn sharpen(bitmap: &mut Bitmap, strength: f32) {
    if !(strength > 0.0) {
        return;
    }
    let (w, h) = (bitmap.width() as usize, bitmap.height() as usize);
    if w < 3 || h < 3 {
        return;
    }
    let amount = strength * SHARPEN_BLEND;
    let snapshot = bitmap.pixels().to_vec();
    let out = bitmap.pixels_mut();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = (y * w + x) * CHANNELS;
            for c in 0..3 {
                let mut convolved = 0.0;
                for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
                    for (kx, &weight) in row.iter().enumerate() {
                        if weight == 0.0 {
                            continue;
                        }
                        let n = ((y + ky - 1) * w + (x + kx - 1)) * CHANNELS + c;
                        convolved += snapshot[n] as f32 * weight;
                    }
                }
                let original = snapshot[idx + c] as f32;
                out[idx + c] = clamp_channel(original + (convolved - original) * amount);
            }
        }
    }
}

/// Radial darkening: `factor = clamp(1 - (amount / 100) * d^1.5, 0, 1)` where
/// `d` is the distance from the center over the center-to-corner distance.
pub fn vignette(bitmap: &mut Bitmap, amount: f32) {
    if !(amount > 0.0) || bitmap.is_empty() {
        return;
    }
    let strength = amount / 100.0;
    let (w, h) = (bitmap.width(), bitmap.height());
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();
    let out = bitmap.pixels_mut();

    for y in 0..h {
        let dy = y as f32 - cy;
        for x in 0..w {
            let dx = x as f32 - cx;
            let dist = (dx * dx + dy * dy).sqrt() / max_dist;
            let factor = (1.0 - strength * dist.powf(1.5)).clamp(0.0, 1.0);
            let idx = (y as usize * w as usize + x as usize) * CHANNELS;
            for c in 0..3 {
                out[idx + c] = clamp_channel(out[idx + c] as f32 * factor);
            }
        }
    }
}
