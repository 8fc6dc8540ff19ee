//! Render and encode a finished image.
//!
//! Geometry runs first, so blur radius and vignette falloff apply to the
//! final frame:
//!
//! ```text
//! rotate → flip H → flip V → resize → crop → adjustment pipeline → encode
//! ```
//!
//! A missing export width or height is derived from the rotated dimensions
//! so the aspect ratio is preserved; the resize is skipped when nothing changes.

use crate::bitmap::Bitmap;
use crate::filters::NoiseSource;
use crate::imaging::{
    CropInsets, EncodeError, ExportFormat, FlipAxis, Quality, calc_aspect_ratio, crop, encode,
    flip, resize, rotate,
};
use crate::pipeline::{Pipeline, process_image, process_image_with};
use crate::settings::Settings;
use log::debug;
use std::path::Path;

/// Stem used when the source name has none.
const FALLBACK_STEM: &str = "image";

/// Output options for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub format: ExportFormat,
    pub quality: Quality,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: CropInsets,
    /// Name of the source file; only its stem is kept.
    pub filename: String,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: Quality::default(),
            width: None,
            height: None,
            crop: CropInsets::default(),
            filename: String::new(),
        }
    }
}

/// An encoded image, ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Apply geometry from `settings` and `params`, then the adjustment pipeline.
pub fn render(source: &Bitmap, settings: &Settings, params: &ExportParams) -> Bitmap {
    let framed = frame(source, settings, params);
    process_image(&framed, settings)
}

/// [`render`] with an explicit grain source.
pub fn render_with(
    source: &Bitmap,
    settings: &Settings,
    params: &ExportParams,
    rng: &mut dyn NoiseSource,
) -> Bitmap {
    let framed = frame(source, settings, params);
    process_image_with(&framed, settings, rng)
}

/// The geometry half of [`render`].
fn frame(source: &Bitmap, settings: &Settings, params: &ExportParams) -> Bitmap {
    let mut bitmap = rotate(source, settings.rotation());
    if settings.flip_horizontal {
        bitmap = flip(&bitmap, FlipAxis::Horizontal);
    }
    if settings.flip_vertical {
        bitmap = flip(&bitmap, FlipAxis::Vertical);
    }

    let (w, h) = bitmap.dimensions();
    let target = calc_aspect_ratio(w, h, params.width, params.height);
    if target != (w, h) {
        bitmap = resize(&bitmap, target.0, target.1);
    }

    let bitmap = crop(&bitmap, &params.crop);
    debug!(
        "framed {}x{} -> {}x{}, stages: {:?}",
        source.width(),
        source.height(),
        bitmap.width(),
        bitmap.height(),
        Pipeline::default().active_stages(settings)
    );
    bitmap
}

/// Render and encode.
pub fn export(
    source: &Bitmap,
    settings: &Settings,
    params: &ExportParams,
) -> Result<ExportedFile, EncodeError> {
    finish(render(source, settings, params), params)
}

/// [`export`] with an explicit grain source.
pub fn export_with(
    source: &Bitmap,
    settings: &Settings,
    params: &ExportParams,
    rng: &mut dyn NoiseSource,
) -> Result<ExportedFile, EncodeError> {
    finish(render_with(source, settings, params, rng), params)
}

fn finish(rendered: Bitmap, params: &ExportParams) -> Result<ExportedFile, EncodeError> {
    let bytes = encode(&rendered, params.format, params.quality)?;
    Ok(ExportedFile {
        bytes,
        mime: params.format.mime(),
        file_name: download_name(&params.filename, params.format),
        width: rendered.width(),
        height: rendered.height(),
    })
}

/// Output file name: the source stem with the format's extension.
///
/// Directory segments and the old extension are dropped. Both `/` and `\`
/// count as separators.
///
/// # Examples
/// ```
/// # use retouch::export::download_name;
/// # use retouch::imaging::ExportFormat;
/// assert_eq!(download_name("shots/beach.jpeg", ExportFormat::Png), "beach.png");
/// assert_eq!(download_name("", ExportFormat::Jpeg), "image.jpg");
/// ```
pub fn download_name(filename: &str, format: ExportFormat) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM);
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ConstantNoise;
    use crate::settings::ColorMode;
    use crate::test_helpers::gradient;

    fn params(format: ExportFormat) -> ExportParams {
        ExportParams {
            format,
            filename: "holiday/beach.jpeg".to_string(),
            ..ExportParams::default()
        }
    }

    // =========================================================================
    // download_name
    // =========================================================================

    #[test]
    fn download_name_replaces_extension() {
        assert_eq!(download_name("beach.jpeg", ExportFormat::Webp), "beach.webp");
    }

    #[test]
    fn download_name_drops_directories() {
        assert_eq!(download_name("a/b/c.png", ExportFormat::Bmp), "c.bmp");
        assert_eq!(download_name(r"C:\photos\d.png", ExportFormat::Jpeg), "d.jpg");
    }

    #[test]
    fn download_name_keeps_inner_dots() {
        assert_eq!(download_name("my.photo.png", ExportFormat::Avif), "my.photo.avif");
    }

    #[test]
    fn download_name_without_extension() {
        assert_eq!(download_name("scan", ExportFormat::Png), "scan.png");
    }

    #[test]
    fn download_name_falls_back() {
        assert_eq!(download_name("", ExportFormat::Png), "image.png");
        assert_eq!(download_name("dir/", ExportFormat::Png), "image.png");
    }

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn render_identity_is_copy() {
        let src = gradient(10, 6);
        let out = render(&src, &Settings::default(), &ExportParams::default());
        assert_eq!(out, src);
    }

    #[test]
    fn render_rotation_swaps_dimensions_before_resize() {
        let src = gradient(40, 20);
        let settings = Settings {
            rotation: 90,
            ..Settings::default()
        };
        let p = ExportParams {
            width: Some(10),
            ..ExportParams::default()
        };
        // Rotated frame is 20x40, so width 10 derives height 20
        assert_eq!(render(&src, &settings, &p).dimensions(), (10, 20));
    }

    #[test]
    fn render_crops_after_resize() {
        let src = gradient(100, 50);
        let p = ExportParams {
            width: Some(50),
            crop: CropInsets {
                left: 10.0,
                right: 10.0,
                ..CropInsets::default()
            },
            ..ExportParams::default()
        };
        // 100x50 → 50x25, then 80% of the width
        assert_eq!(
            render(&src, &Settings::default(), &p).dimensions(),
            (40, 25)
        );
    }

    #[test]
    fn render_flips_horizontal_then_vertical() {
        let src = Bitmap::from_fn(2, 2, |x, y| [(y * 2 + x) as u8, 0, 0, 255]).unwrap();
        let settings = Settings {
            flip_horizontal: true,
            flip_vertical: true,
            ..Settings::default()
        };
        let out = render(&src, &settings, &ExportParams::default());
        let reds: Vec<u8> = out.pixels().chunks(4).map(|p| p[0]).collect();
        assert_eq!(reds, vec![3, 2, 1, 0]);
    }

    #[test]
    fn render_runs_pipeline_on_framed_image() {
        let src = Bitmap::filled(4, 4, [10, 20, 30, 255]).unwrap();
        let settings = Settings {
            invert: true,
            rotation: 180,
            ..Settings::default()
        };
        let out = render(&src, &settings, &ExportParams::default());
        assert_eq!(out.pixel(0, 0), Some([245, 235, 225, 255]));
    }

    // =========================================================================
    // export
    // =========================================================================

    #[test]
    fn export_bmp_reports_file_details() {
        let src = gradient(5, 3);
        let file = export(&src, &Settings::default(), &params(ExportFormat::Bmp)).unwrap();
        assert_eq!(file.mime, "image/bmp");
        assert_eq!(file.file_name, "beach.bmp");
        assert_eq!((file.width, file.height), (5, 3));
        assert_eq!(&file.bytes[..2], b"BM");
    }

    #[test]
    fn export_png_decodes_to_rendered_pixels() {
        let src = gradient(6, 6);
        let settings = Settings {
            color_mode: ColorMode::Grayscale,
            noise: 20.0,
            ..Settings::default()
        };
        let p = params(ExportFormat::Png);
        let file = export_with(&src, &settings, &p, &mut ConstantNoise(0.75)).unwrap();
        let expected = render_with(&src, &settings, &p, &mut ConstantNoise(0.75));
        let decoded = image::load_from_memory(&file.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), expected.pixels());
    }
}
