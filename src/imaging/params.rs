//! Parameter types for geometry and export operations.
//!
//! These describe *what* to do; [`transform`](super::transform) and
//! [`encoder`](super::encoder) do the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality as a fraction (0.0–1.0, default 0.92). Clamped on construction.
//! - [`Rotation`]: quarter-turn rotation, clockwise.
//! - [`FlipAxis`]: mirror axis.
//! - [`CropInsets`]: percentage trimmed from each edge.

use serde::{Deserialize, Serialize};

/// Quality for lossy encoders, as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale most native encoders expect.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.92)
    }
}

/// Clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Half,
    Ccw90,
}

impl Rotation {
    /// Exact quarter turns only: `90`, `-270` and `450` all map to [`Rotation::Cw90`].
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Cw90),
            180 => Some(Self::Half),
            270 => Some(Self::Ccw90),
            _ => None,
        }
    }

    /// Round to the nearest quarter turn and normalize into `0..360`.
    pub fn snap_degrees(degrees: i32) -> i32 {
        (degrees.saturating_add(45).div_euclid(90) * 90).rem_euclid(360)
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Half => 180,
            Self::Ccw90 => 270,
        }
    }

    /// `(cos, sin)` of the clockwise angle, exact for quarter turns.
    pub(crate) fn cos_sin(self) -> (i64, i64) {
        match self {
            Self::None => (1, 0),
            Self::Cw90 => (0, 1),
            Self::Half => (-1, 0),
            Self::Ccw90 => (0, -1),
        }
    }

    /// Quarter turns (not half turns) swap width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Cw90 | Self::Ccw90)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Mirror left/right.
    Horizontal,
    /// Mirror top/bottom.
    Vertical,
}

/// Percentage trimmed from each edge, each in `[0, 100)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropInsets {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl CropInsets {
    pub fn is_empty(&self) -> bool {
        self.top == 0.0 && self.bottom == 0.0 && self.left == 0.0 && self.right == 0.0
    }
}
