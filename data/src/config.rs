pub mod palette;
pub mod render;
pub mod state;

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.8;
pub const MAX_SCALE: f32 = 1.5;

/// UI scale factor. Multiplied by the window's own factor for the meter's device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(from = "f32")]
pub struct ScaleFactor(f32);

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f32> for ScaleFactor {
    fn from(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(MIN_SCALE, MAX_SCALE))
        } else {
            Self::default()
        }
    }
}

impl From<ScaleFactor> for f32 {
    fn from(value: ScaleFactor) -> Self {
        value.0
    }
}

/// Keyboard modifier that turns primary clicks into marker placement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Modifier {
    #[default]
    Shift,
    Control,
    Alt,
    Logo,
}

impl Modifier {
    pub fn is_held(self, modifiers: iced_core::keyboard::Modifiers) -> bool {
        match self {
            Modifier::Shift => modifiers.shift(),
            Modifier::Control => modifiers.control(),
            Modifier::Alt => modifiers.alt(),
            Modifier::Logo => modifiers.logo(),
        }
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Control => write!(f, "Ctrl"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Logo => write!(f, "Super"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Interaction {
    pub annotate_modifier: Modifier,
    /// Marker hit band, in logical pixels on either side of the line
    pub hit_tolerance_px: f32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            annotate_modifier: Modifier::default(),
            hit_tolerance_px: 6.0,
        }
    }
}
