//! Adjustment settings: the typed record, partial overrides, and layered loading.
//!
//! A [`Settings`] value fully describes one edit. Callers rarely build one by
//! hand; they start from the defaults (every adjustment off) and overlay
//! partial records on top:
//!
//! ```text
//! stock defaults  →  settings files (--settings a.toml --settings b.json)  →  --set key=value
//! ```
//!
//! Files are sparse; specify only what you want to change:
//!
//! ```toml
//! contrast = 25
//! color_mode = "sepia"
//! vignette = 40
//! ```
//!
//! Unknown keys are rejected to catch typos early. Numeric values outside
//! their documented domain are clamped (with a warning) rather than rejected.
//!
//! In code, the partial record is [`SettingsPatch`] and the merge is
//! [`Settings::merged`].

use crate::imaging::Rotation;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid assignment '{0}': expected key=value")]
    Assignment(String),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Mutually exclusive color reduction applied after hue/saturation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    None,
    Grayscale,
    #[serde(alias = "black_white")]
    BlackWhite,
    Sepia,
}

impl ColorMode {
    /// Collapse independent grayscale / black-white / sepia toggles into one mode.
    ///
    /// Black/white wins over grayscale, which wins over sepia.
    pub fn from_flags(grayscale: bool, blackwhite: bool, sepia: bool) -> Self {
        if blackwhite {
            Self::BlackWhite
        } else if grayscale {
            Self::Grayscale
        } else if sepia {
            Self::Sepia
        } else {
            Self::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::BlackWhite => "blackwhite",
            Self::Sepia => "sepia",
        }
    }
}

/// The full adjustment record.
///
/// Defaults: every numeric field 0, every toggle off, preset `"none"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Additive brightness, -100..=100.
    pub brightness: f32,
    /// Contrast, -100..=100.
    pub contrast: f32,
    /// Saturation, -100..=100 (-100 = fully desaturated).
    pub saturation: f32,
    /// Exposure, -100..=100 (±50 = one stop).
    pub exposure: f32,
    /// Hue rotation in degrees, -180..=180.
    pub hue: f32,
    /// Unsharp-mask strength, 0..=10.
    pub sharpness: f32,
    /// Grain amount, 0..=100.
    pub noise: f32,
    /// Box blur radius, 0..=20.
    pub blur: f32,
    /// Vignette strength, 0..=100.
    pub vignette: f32,
    /// White balance shift, -100 (cool) ..=100 (warm).
    pub temperature: f32,
    pub color_mode: ColorMode,
    pub invert: bool,
    /// Key of the preset these settings came from, for display only.
    pub preset: String,
    /// Clockwise rotation in degrees, a multiple of 90.
    pub rotation: i32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            exposure: 0.0,
            hue: 0.0,
            sharpness: 0.0,
            noise: 0.0,
            blur: 0.0,
            vignette: 0.0,
            temperature: 0.0,
            color_mode: ColorMode::None,
            invert: false,
            preset: "none".to_string(),
            rotation: 0,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

/// A partial [`Settings`] record: `None` means "keep the base value".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPatch {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub exposure: Option<f32>,
    pub hue: Option<f32>,
    pub sharpness: Option<f32>,
    pub noise: Option<f32>,
    pub blur: Option<f32>,
    pub vignette: Option<f32>,
    pub temperature: Option<f32>,
    pub color_mode: Option<ColorMode>,
    pub invert: Option<bool>,
    pub preset: Option<String>,
    pub rotation: Option<i32>,
    pub flip_horizontal: Option<bool>,
    pub flip_vertical: Option<bool>,
}

/// Documented domain of each numeric field.
const DOMAINS: [(&str, f32, f32); 10] = [
    ("brightness", -100.0, 100.0),
    ("contrast", -100.0, 100.0),
    ("saturation", -100.0, 100.0),
    ("exposure", -100.0, 100.0),
    ("hue", -180.0, 180.0),
    ("sharpness", 0.0, 10.0),
    ("noise", 0.0, 100.0),
    ("blur", 0.0, 20.0),
    ("vignette", 0.0, 100.0),
    ("temperature", -100.0, 100.0),
];

impl Settings {
    /// Overlay `patch` on these settings. Fields set in the patch win.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut out = self.clone();
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if let Some(v) = &patch.$field { out.$field = v.clone(); })*
            };
        }
        overlay!(
            brightness,
            contrast,
            saturation,
            exposure,
            hue,
            sharpness,
            noise,
            blur,
            vignette,
            temperature,
            color_mode,
            invert,
            preset,
            rotation,
            flip_horizontal,
            flip_vertical
        );
        out
    }

    /// Defaults for every filter field, keeping rotation and flips.
    pub fn reset_filters(&self) -> Self {
        Self {
            rotation: self.rotation,
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
            ..Self::default()
        }
    }

    fn numeric_fields_mut(&mut self) -> [&mut f32; 10] {
        [
            &mut self.brightness,
            &mut self.contrast,
            &mut self.saturation,
            &mut self.exposure,
            &mut self.hue,
            &mut self.sharpness,
            &mut self.noise,
            &mut self.blur,
            &mut self.vignette,
            &mut self.temperature,
        ]
    }

    /// Clamp numeric fields into their domains and snap rotation to a quarter turn.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for (value, (name, min, max)) in out.numeric_fields_mut().into_iter().zip(DOMAINS) {
            let fixed = if value.is_nan() { 0.0 } else { value.clamp(min, max) };
            if fixed != *value {
                warn!("{name} = {value} is outside {min}..={max}, using {fixed}");
                *value = fixed;
            }
        }
        let snapped = Rotation::snap_degrees(out.rotation);
        if snapped != out.rotation {
            warn!("rotation = {} is not a quarter turn, using {snapped}", out.rotation);
            out.rotation = snapped;
        }
        out
    }

    /// True when these settings leave every bitmap untouched. The preset tag is ignored.
    pub fn is_identity(&self) -> bool {
        let defaults = Self::default();
        Self {
            preset: defaults.preset.clone(),
            ..self.clone()
        } == defaults
    }

    /// The geometric rotation these settings request.
    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(Rotation::snap_degrees(self.rotation)).unwrap_or_default()
    }
}

// =============================================================================
// Layered loading
// =============================================================================

/// The default settings as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, SettingsError> {
    Ok(toml::Value::try_from(Settings::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a settings file as a raw layer. `.json` files are parsed as JSON,
/// everything else as TOML.
pub fn load_settings_file(path: &Path) -> Result<toml::Value, SettingsError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(toml::from_str(&content)?)
    }
}

/// Turn a `key=value` assignment into a one-key layer.
///
/// The value is parsed as a TOML literal; bare words fall back to strings so
/// `color_mode=sepia` works without quoting.
pub fn parse_assignment(assignment: &str) -> Result<toml::Value, SettingsError> {
    let (key, value) = assignment
        .split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, v)| {
            !k.is_empty()
                && !v.is_empty()
                && k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
        .ok_or_else(|| SettingsError::Assignment(assignment.to_string()))?;

    toml::from_str::<toml::Value>(&format!("{key} = {value}")).or_else(|_| {
        let mut table = toml::map::Map::new();
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        Ok(toml::Value::Table(table))
    })
}

/// Merge `layers` in order onto the stock defaults, deserialize, and clamp.
pub fn resolve_settings(
    layers: impl IntoIterator<Item = toml::Value>,
) -> Result<Settings, SettingsError> {
    let merged = layers
        .into_iter()
        .fold(stock_defaults_value()?, merge_toml);
    let settings: Settings = merged.try_into()?;
    Ok(settings.clamped())
}

/// Returns a fully-commented settings file whose values are the defaults.
///
/// Used by the `gen-config` CLI command.
pub fn stock_settings_toml() -> &'static str {
    r##"# Retouch settings
# ================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults (every adjustment off).
#
# Layers are merged in order: defaults, then each --settings file, then each
# --set key=value. Unknown keys cause an error; out-of-range numbers are
# clamped to the range shown.

# ---------------------------------------------------------------------------
# Tone
# ---------------------------------------------------------------------------
exposure = 0.0        # -100..100, +50 = one stop brighter
brightness = 0.0      # -100..100, additive
contrast = 0.0        # -100..100

# ---------------------------------------------------------------------------
# Color
# ---------------------------------------------------------------------------
temperature = 0.0     # -100 (cool) .. 100 (warm)
saturation = 0.0      # -100 (gray) .. 100
hue = 0.0             # -180..180 degrees

# One of "none", "grayscale", "blackwhite", "sepia".
color_mode = "none"
invert = false

# ---------------------------------------------------------------------------
# Detail and effects
# ---------------------------------------------------------------------------
blur = 0.0            # 0..20 pixel radius
sharpness = 0.0       # 0..10
noise = 0.0           # 0..100
vignette = 0.0        # 0..100

# Informational: which preset these values came from.
preset = "none"

# ---------------------------------------------------------------------------
# Geometry (kept when a preset is applied)
# ---------------------------------------------------------------------------
rotation = 0          # 0, 90, 180 or 270 (negative quarter turns also accepted)
flip_horizontal = false
flip_vertical = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_identity() {
        let s = Settings::default();
        assert!(s.is_identity());
        assert_eq!(s.preset, "none");
        assert_eq!(s.color_mode, ColorMode::None);
    }

    #[test]
    fn preset_tag_does_not_break_identity() {
        let s = Settings {
            preset: "noir".into(),
            ..Settings::default()
        };
        assert!(s.is_identity());
    }

    #[test]
    fn any_adjustment_breaks_identity() {
        assert!(!Settings { blur: 1.0, ..Settings::default() }.is_identity());
        assert!(!Settings { invert: true, ..Settings::default() }.is_identity());
        assert!(!Settings { rotation: 90, ..Settings::default() }.is_identity());
    }

    #[test]
    fn color_mode_priority() {
        assert_eq!(ColorMode::from_flags(true, true, true), ColorMode::BlackWhite);
        assert_eq!(ColorMode::from_flags(true, false, true), ColorMode::Grayscale);
        assert_eq!(ColorMode::from_flags(false, false, true), ColorMode::Sepia);
        assert_eq!(ColorMode::from_flags(false, false, false), ColorMode::None);
    }

    #[test]
    fn merged_patch_fields_win() {
        let base = Settings {
            contrast: 10.0,
            blur: 2.0,
            ..Settings::default()
        };
        let patch = SettingsPatch {
            contrast: Some(-20.0),
            color_mode: Some(ColorMode::Sepia),
            ..SettingsPatch::default()
        };
        let out = base.merged(&patch);
        assert_eq!(out.contrast, -20.0);
        assert_eq!(out.blur, 2.0);
        assert_eq!(out.color_mode, ColorMode::Sepia);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let base = Settings {
            hue: 45.0,
            ..Settings::default()
        };
        assert_eq!(base.merged(&SettingsPatch::default()), base);
    }

    #[test]
    fn reset_filters_keeps_geometry() {
        let s = Settings {
            contrast: 40.0,
            invert: true,
            preset: "vivid".into(),
            rotation: 270,
            flip_vertical: true,
            ..Settings::default()
        };
        let reset = s.reset_filters();
        assert_eq!(reset.contrast, 0.0);
        assert!(!reset.invert);
        assert_eq!(reset.preset, "none");
        assert_eq!(reset.rotation, 270);
        assert!(reset.flip_vertical);
    }

    #[test]
    fn clamped_limits_each_domain() {
        let s = Settings {
            brightness: 150.0,
            hue: -400.0,
            sharpness: -1.0,
            blur: 99.0,
            noise: f32::NAN,
            rotation: 100,
            ..Settings::default()
        }
        .clamped();
        assert_eq!(s.brightness, 100.0);
        assert_eq!(s.hue, -180.0);
        assert_eq!(s.sharpness, 0.0);
        assert_eq!(s.blur, 20.0);
        assert_eq!(s.noise, 0.0);
        assert_eq!(s.rotation, 90);
    }

    #[test]
    fn clamped_keeps_in_range_values() {
        let s = Settings {
            contrast: -55.5,
            temperature: 12.0,
            rotation: -90,
            ..Settings::default()
        };
        let c = s.clamped();
        assert_eq!(c.contrast, -55.5);
        assert_eq!(c.temperature, 12.0);
        assert_eq!(c.rotation, 270);
    }

    // =========================================================================
    // Layered loading
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("contrast = 1.0\nblur = 2.0").unwrap();
        let overlay: toml::Value = toml::from_str("contrast = 5.0").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("contrast").unwrap().as_float(), Some(5.0));
        assert_eq!(merged.get("blur").unwrap().as_float(), Some(2.0));
    }

    #[test]
    fn resolve_with_no_layers_is_default() {
        let s = resolve_settings(Vec::new()).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn resolve_later_layers_win() {
        let a: toml::Value = toml::from_str("contrast = 10.0\nvignette = 5.0").unwrap();
        let b: toml::Value = toml::from_str("contrast = 30.0").unwrap();
        let s = resolve_settings(vec![a, b]).unwrap();
        assert_eq!(s.contrast, 30.0);
        assert_eq!(s.vignette, 5.0);
    }

    #[test]
    fn resolve_rejects_unknown_key() {
        let bad: toml::Value = toml::from_str("contrastt = 10.0").unwrap();
        assert!(resolve_settings(vec![bad]).is_err());
    }

    #[test]
    fn resolve_clamps_out_of_range() {
        let layer: toml::Value = toml::from_str("brightness = 500.0").unwrap();
        let s = resolve_settings(vec![layer]).unwrap();
        assert_eq!(s.brightness, 100.0);
    }

    #[test]
    fn parse_assignment_number() {
        let layer = parse_assignment("contrast=25.0").unwrap();
        assert_eq!(layer.get("contrast").unwrap().as_float(), Some(25.0));
    }

    #[test]
    fn parse_assignment_bare_word_becomes_string() {
        let layer = parse_assignment("color_mode = sepia").unwrap();
        assert_eq!(layer.get("color_mode").unwrap().as_str(), Some("sepia"));
        let s = resolve_settings(vec![layer]).unwrap();
        assert_eq!(s.color_mode, ColorMode::Sepia);
    }

    #[test]
    fn parse_assignment_rejects_garbage() {
        assert!(parse_assignment("contrast").is_err());
        assert!(parse_assignment("=5").is_err());
        assert!(parse_assignment("a b=5").is_err());
        assert!(parse_assignment("blur=").is_err());
    }

    #[test]
    fn load_toml_and_json_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let toml_path = tmp.path().join("look.toml");
        fs::write(&toml_path, "saturation = 20.0\ncolor_mode = \"grayscale\"\n").unwrap();
        let json_path = tmp.path().join("look.json");
        fs::write(&json_path, r#"{"saturation": 40.0, "invert": true}"#).unwrap();

        let s = resolve_settings(vec![
            load_settings_file(&toml_path).unwrap(),
            load_settings_file(&json_path).unwrap(),
        ])
        .unwrap();
        assert_eq!(s.saturation, 40.0);
        assert_eq!(s.color_mode, ColorMode::Grayscale);
        assert!(s.invert);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_settings_file(Path::new("/nonexistent/look.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn stock_settings_toml_roundtrips_to_defaults() {
        let layer: toml::Value = toml::from_str(stock_settings_toml()).unwrap();
        let s = resolve_settings(vec![layer]).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn color_mode_accepts_snake_case_alias() {
        let layer = parse_assignment("color_mode=\"black_white\"").unwrap();
        let s = resolve_settings(vec![layer]).unwrap();
        assert_eq!(s.color_mode, ColorMode::BlackWhite);
    }
}
