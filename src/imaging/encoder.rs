//! Export formats and encoder dispatch.
//!
//! | Format | Encoder | Quality |
//! |---|---|---|
//! | PNG | `image::codecs::png` | ignored |
//! | JPEG | `image::codecs::jpeg` (alpha dropped) | `quality * 100` |
//! | WebP | `image::codecs::webp` (lossless only) | ignored |
//! | AVIF | `image::codecs::avif` (rav1e, speed 6) | `quality * 100` |
//! | BMP | [`super::bmp`], hand-written 24-bit | ignored |

use super::bmp::encode_bmp;
use super::params::Quality;
use crate::bitmap::{Bitmap, CHANNELS};
use image::{ExtendedColorType, ImageEncoder};
use log::debug;
use thiserror::Error;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("{0} encoder produced no output")]
    EmptyOutput(ExportFormat),
    #[error("Image too large to encode: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
    #[error("Encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Avif,
    Bmp,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Webp,
        ExportFormat::Avif,
        ExportFormat::Bmp,
    ];

    /// Parse a format name or file extension, case-insensitively.
    pub fn parse(input: &str) -> Result<Self, EncodeError> {
        let normalized = input.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "avif" => Ok(Self::Avif),
            "bmp" => Ok(Self::Bmp),
            _ => Err(EncodeError::UnsupportedFormat(input.trim().to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WebP",
            Self::Avif => "AVIF",
            Self::Bmp => "BMP",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Bmp => "bmp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Bmp => "image/bmp",
        }
    }

    /// Whether the quality setting has any effect.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::Avif)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encode `bitmap` in `format`. An encoder that returns zero bytes is an error.
pub fn encode(
    bitmap: &Bitmap,
    format: ExportFormat,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    let (w, h) = bitmap.dimensions();
    let mut out = Vec::new();

    match format {
        ExportFormat::Bmp => out = encode_bmp(bitmap)?,
        ExportFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut out).write_image(
                bitmap.pixels(),
                w,
                h,
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpeg => {
            let rgb = drop_alpha(bitmap.pixels());
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.percent())
                .write_image(&rgb, w, h, ExtendedColorType::Rgb8)?;
        }
        ExportFormat::Webp => {
            image::codecs::webp::WebPEncoder::new_lossless(&mut out).write_image(
                bitmap.pixels(),
                w,
                h,
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Avif => {
            image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut out,
                AVIF_SPEED,
                quality.percent(),
            )
            .write_image(bitmap.pixels(), w, h, ExtendedColorType::Rgba8)?;
        }
    }

    if out.is_empty() {
        return Err(EncodeError::EmptyOutput(format));
    }
    debug!("encoded {w}x{h} as {format}: {} bytes", out.len());
    Ok(out)
}

fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / CHANNELS * 3);
    for px in rgba.chunks_exact(CHANNELS) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}
