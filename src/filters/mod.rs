//! Pixel and neighborhood operators.
//!
//! | Operator | Kind | Function |
//! |---|---|---|
//! | Brightness, contrast, saturation, exposure | per-pixel | [`pixel`] |
//! | Hue rotation (via HSL) | per-pixel | [`pixel::hue_rotate`] |
//! | Grayscale, black/white, sepia, invert | per-pixel | [`pixel`] |
//! | Temperature, noise | per-pixel | [`pixel`] |
//! | Box blur (two-pass) | neighborhood | [`neighborhood::blur`] |
//! | Unsharp mask (3×3) | neighborhood | [`neighborhood::sharpen`] |
//! | Vignette | radial | [`neighborhood::vignette`] |
//!
//! Operators are plain functions; ordering lives in [`crate::pipeline`].

pub mod neighborhood;
pub mod noise;
pub mod pixel;

pub use noise::{ConstantNoise, NoiseSource, XorShift};
