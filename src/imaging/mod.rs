//! Geometry and encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Resize** | Lanczos3 via `image::imageops::resize`, halfway step for large downscales |
//! | **Crop / rotate / flip** | plain buffer copies |
//! | **PNG / JPEG / WebP / AVIF** | `image` crate encoders |
//! | **BMP** | hand-written 24-bit top-down writer |
//!
//! The module is split into:
//! - **Calculations**: pure functions for dimension math (unit testable)
//! - **Parameters**: data structures describing geometry and export options
//! - **Transform**: the pixel work behind resize, crop, rotate and flip
//! - **Encoder / BMP / Size**: format dispatch, the BMP writer, size estimates

pub mod bmp;
mod calculations;
pub mod encoder;
mod params;
mod size;
pub mod transform;

pub use calculations::{CropRect, calc_aspect_ratio, crop_rect};
pub use encoder::{EncodeError, ExportFormat, encode};
pub use params::{CropInsets, FlipAxis, Quality, Rotation};
pub use size::{estimate_size, format_bytes};
pub use transform::{crop, flip, resize, resize_with_steps, rotate, rotate_degrees};
