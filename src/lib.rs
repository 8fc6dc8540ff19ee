//! # Retouch
//!
//! A photo adjustment pipeline: tone and color operators, blur and sharpening,
//! vignette and grain, quarter-turn geometry, and exporters for PNG, JPEG,
//! WebP, AVIF and a hand-written BMP encoder.
//!
//! # Architecture: Geometry, Then a Fixed Pipeline
//!
//! ```text
//! Bitmap ──rotate/flip/resize/crop──▶ Bitmap ──12 ordered stages──▶ Bitmap ──encode──▶ bytes
//! ```
//!
//! Every edit is described by one [`settings::Settings`] value. Geometry
//! produces new bitmaps; adjustments mutate a private copy in place; the
//! caller's bitmap is never touched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`bitmap`] | Owned RGBA8 buffer with checked dimensions |
//! | [`color`] | BT.709 luma and RGB ↔ HSL conversion |
//! | [`filters`] | Per-pixel operators, neighborhood operators (blur, sharpen, vignette), noise sources |
//! | [`settings`] | The settings record, partial overrides, layered TOML/JSON loading, clamping |
//! | [`presets`] | Read-only table of named looks |
//! | [`pipeline`] | The ordered stage list and `process_image` |
//! | [`imaging`] | Geometry, dimension math, encoders, size estimates |
//! | [`export`] | Geometry + pipeline + encoder for one image |
//! | [`batch`] | Parallel multi-file export for the CLI |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Ordered Stages Over a Conditional Chain
//!
//! The adjustment order is observable in the output (brightening before
//! inverting is not the same as inverting before brightening). The pipeline
//! is an explicit list of [`pipeline::Stage`] values, each with an activity
//! test and an apply step, so tests can assert the order directly.
//!
//! ## One Color Mode
//!
//! Grayscale, black/white and sepia are mutually exclusive, so they are one
//! [`settings::ColorMode`] field rather than three booleans. Callers holding
//! three flags convert with [`settings::ColorMode::from_flags`].
//!
//! ## Clamp at the Boundary
//!
//! Settings from files and the command line are clamped into their documented
//! ranges when resolved, with a warning per adjusted field. The operators
//! themselves also tolerate out-of-range input without panicking.
//!
//! ## Substitutable Randomness
//!
//! Grain draws from a [`filters::NoiseSource`]. The default is seeded from the
//! clock; tests pass a seeded [`filters::XorShift`] or a constant source.
//!
//! ## Byte-Exact BMP
//!
//! BMP output is written by hand in [`imaging::bmp`]: 24-bit, top-down
//! (negative height), rows padded to four bytes. The other formats go
//! through the `image` crate's encoders.

pub mod batch;
pub mod bitmap;
pub mod color;
pub mod export;
pub mod filters;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod presets;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_helpers;
