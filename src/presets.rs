//! Named looks: a static, read-only table of partial settings.
//!
//! Applying a preset discards every filter adjustment, keeps the geometry
//! (rotation and flips), overlays the preset's fields, and records the
//! preset key so a UI can highlight it.

use crate::settings::{ColorMode, Settings, SettingsError, SettingsPatch};
use std::sync::LazyLock;

/// A named bundle of filter overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub key: &'static str,
    pub label: &'static str,
    pub patch: SettingsPatch,
}

fn preset(key: &'static str, label: &'static str, patch: SettingsPatch) -> Preset {
    Preset { key, label, patch }
}

static PRESETS: LazyLock<Vec<Preset>> = LazyLock::new(|| {
    vec![
        preset("none", "Original", SettingsPatch::default()),
        preset(
            "vintage",
            "Vintage",
            SettingsPatch {
                color_mode: Some(ColorMode::Sepia),
                contrast: Some(-10.0),
                saturation: Some(-20.0),
                vignette: Some(30.0),
                noise: Some(10.0),
                temperature: Some(20.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "noir",
            "Noir",
            SettingsPatch {
                color_mode: Some(ColorMode::Grayscale),
                contrast: Some(50.0),
                brightness: Some(-10.0),
                vignette: Some(50.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "vivid",
            "Vivid",
            SettingsPatch {
                saturation: Some(40.0),
                contrast: Some(20.0),
                sharpness: Some(2.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "warm",
            "Warm",
            SettingsPatch {
                temperature: Some(40.0),
                saturation: Some(10.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "cool",
            "Cool",
            SettingsPatch {
                temperature: Some(-40.0),
                saturation: Some(-5.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "dramatic",
            "Dramatic",
            SettingsPatch {
                contrast: Some(60.0),
                exposure: Some(-10.0),
                vignette: Some(40.0),
                sharpness: Some(3.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "fade",
            "Fade",
            SettingsPatch {
                contrast: Some(-30.0),
                brightness: Some(10.0),
                saturation: Some(-30.0),
                ..SettingsPatch::default()
            },
        ),
        preset(
            "lomo",
            "Lomo",
            SettingsPatch {
                contrast: Some(30.0),
                saturation: Some(30.0),
                vignette: Some(70.0),
                ..SettingsPatch::default()
            },
        ),
    ]
});

/// Every preset in display order.
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

pub fn find_preset(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key.eq_ignore_ascii_case(key))
}

pub fn preset_keys() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.key).collect()
}

/// Reset filters, overlay the preset, and tag the result with its key.
pub fn apply_preset(settings: &Settings, key: &str) -> Result<Settings, SettingsError> {
    let preset = find_preset(key).ok_or_else(|| SettingsError::UnknownPreset(key.to_string()))?;
    let mut out = settings.reset_filters().merged(&preset.patch);
    out.preset = preset.key.to_string();
    Ok(out)
}
