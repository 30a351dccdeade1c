use super::palette::Palette;

use serde::{Deserialize, Serialize};

/// Everything the meter painter reads. Replaced wholesale on settings changes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub layout: Positioning,
    pub palette: Palette,
    pub fonts: Fonts,
    pub features: Features,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Positioning {
    /// Horizontal position of the axis as a fraction of the surface width
    pub axis_x_ratio: f32,
    /// Vertical padding above the top and below the bottom of the price window
    pub padding: f32,
    /// Length of the price ticks drawn across the axis
    pub tick_length: f32,
    /// Space between a tick and its label
    pub label_gap: f32,
    /// Length of the percentage ladder ticks
    pub ladder_tick_length: f32,
    /// Screen distance under which a 50% reference line is hidden behind its boundary
    pub reference_min_gap: f32,
}

impl Positioning {
    pub fn axis_x(&self, width: f32) -> f32 {
        width * self.axis_x_ratio.clamp(0.0, 1.0)
    }
}

impl Default for Positioning {
    fn default() -> Self {
        Self {
            axis_x_ratio: 0.4,
            padding: 24.0,
            tick_length: 12.0,
            label_gap: 6.0,
            ladder_tick_length: 6.0,
            reference_min_gap: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Fonts {
    pub label_size: f32,
    pub badge_size: f32,
    pub status_size: f32,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            label_size: 11.0,
            badge_size: 11.0,
            status_size: 13.0,
        }
    }
}

/// Per-layer switches; every layer is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Features {
    pub background: bool,
    pub axis: bool,
    pub center_line: bool,
    pub boundaries: bool,
    pub reference_lines: bool,
    pub percentage_ladder: bool,
    pub range_badge: bool,
    pub price_labels: bool,
    pub markers: bool,
    pub measurement: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            background: true,
            axis: true,
            center_line: true,
            boundaries: true,
            reference_lines: true,
            percentage_ladder: true,
            range_badge: true,
            price_labels: true,
            markers: true,
            measurement: true,
        }
    }
}
