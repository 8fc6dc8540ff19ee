//! The fixed adjustment order.
//!
//! Stages run in [`Stage::ORDER`]; each one is skipped when its setting is at
//! the default. Reordering changes output, so the order is part of the
//! contract and tests pin it down.
//!
//! ```text
//! Blur → Exposure → Brightness → Contrast → Temperature → Saturation →
//! HueRotation → Sharpness → ColorMode → Invert → Noise → Vignette
//! ```

use crate::bitmap::Bitmap;
use crate::filters::{NoiseSource, XorShift, neighborhood, pixel};
use crate::settings::{ColorMode, Settings, SettingsPatch};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Blur,
    Exposure,
    Brightness,
    Contrast,
    Temperature,
    Saturation,
    HueRotation,
    Sharpness,
    ColorMode,
    Invert,
    Noise,
    Vignette,
}

impl Stage {
    pub const ORDER: [Stage; 12] = [
        Stage::Blur,
        Stage::Exposure,
        Stage::Brightness,
        Stage::Contrast,
        Stage::Temperature,
        Stage::Saturation,
        Stage::HueRotation,
        Stage::Sharpness,
        Stage::ColorMode,
        Stage::Invert,
        Stage::Noise,
        Stage::Vignette,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Blur => "blur",
            Stage::Exposure => "exposure",
            Stage::Brightness => "brightness",
            Stage::Contrast => "contrast",
            Stage::Temperature => "temperature",
            Stage::Saturation => "saturation",
            Stage::HueRotation => "hue",
            Stage::Sharpness => "sharpness",
            Stage::ColorMode => "color_mode",
            Stage::Invert => "invert",
            Stage::Noise => "noise",
            Stage::Vignette => "vignette",
        }
    }

    /// Whether `settings` asks this stage to change anything.
    pub fn is_active(self, settings: &Settings) -> bool {
        match self {
            Stage::Blur => settings.blur > 0.0,
            Stage::Exposure => settings.exposure != 0.0,
            Stage::Brightness => settings.brightness != 0.0,
            Stage::Contrast => settings.contrast != 0.0,
            Stage::Temperature => settings.temperature != 0.0,
            Stage::Saturation => settings.saturation != 0.0,
            Stage::HueRotation => settings.hue != 0.0,
            Stage::Sharpness => settings.sharpness > 0.0,
            Stage::ColorMode => settings.color_mode != ColorMode::None,
            Stage::Invert => settings.invert,
            Stage::Noise => settings.noise > 0.0,
            Stage::Vignette => settings.vignette > 0.0,
        }
    }

    pub fn apply(self, bitmap: &mut Bitmap, settings: &Settings, rng: &mut dyn NoiseSource) {
        match self {
            Stage::Blur => neighborhood::blur(bitmap, settings.blur),
            Stage::Exposure => pixel::exposure(bitmap.pixels_mut(), settings.exposure),
            Stage::Brightness => pixel::brightness(bitmap.pixels_mut(), settings.brightness),
            Stage::Contrast => pixel::contrast(bitmap.pixels_mut(), settings.contrast),
            Stage::Temperature => pixel::temperature(bitmap.pixels_mut(), settings.temperature),
            Stage::Saturation => pixel::saturation(bitmap.pixels_mut(), settings.saturation),
            Stage::HueRotation => pixel::hue_rotate(bitmap.pixels_mut(), settings.hue),
            Stage::Sharpness => neighborhood::sharpen(bitmap, settings.sharpness),
            Stage::ColorMode => match settings.color_mode {
                ColorMode::None => {}
                ColorMode::Grayscale => pixel::grayscale(bitmap.pixels_mut()),
                ColorMode::BlackWhite => {
                    pixel::black_white(bitmap.pixels_mut(), pixel::BLACK_WHITE_THRESHOLD)
                }
                ColorMode::Sepia => pixel::sepia(bitmap.pixels_mut()),
            },
            Stage::Invert => pixel::invert(bitmap.pixels_mut()),
            Stage::Noise => pixel::noise(bitmap.pixels_mut(), settings.noise, rng),
            Stage::Vignette => neighborhood::vignette(bitmap, settings.vignette),
        }
    }
}

/// An ordered list of stages.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stages: Stage::ORDER.to_vec(),
        }
    }
}

impl Pipeline {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The stages that would run for `settings`, in order.
    pub fn active_stages(&self, settings: &Settings) -> Vec<Stage> {
        self.stages
            .iter()
            .copied()
            .filter(|stage| stage.is_active(settings))
            .collect()
    }

    /// Run every active stage over `bitmap` in place.
    pub fn run(&self, bitmap: &mut Bitmap, settings: &Settings, rng: &mut dyn NoiseSource) {
        for stage in self.active_stages(settings) {
            debug!(
                "stage {} on {}x{}",
                stage.name(),
                bitmap.width(),
                bitmap.height()
            );
            stage.apply(bitmap, settings, rng);
        }
    }
}

/// Adjust a copy of `source`. Grain, if any, is drawn from an entropy-seeded source.
pub fn process_image(source: &Bitmap, settings: &Settings) -> Bitmap {
    let mut rng = XorShift::from_entropy();
    process_image_with(source, settings, &mut rng)
}

/// Adjust a copy of `source`, drawing grain from `rng`.
pub fn process_image_with(
    source: &Bitmap,
    settings: &Settings,
    rng: &mut dyn NoiseSource,
) -> Bitmap {
    let mut out = source.clone();
    Pipeline::default().run(&mut out, settings, rng);
    out
}

/// Adjust a copy of `source` using the defaults overlaid with `patch`.
pub fn process_image_patch(source: &Bitmap, patch: &SettingsPatch) -> Bitmap {
    let settings = Settings::default().merged(patch).clamped();
    process_image(source, &settings)
}
