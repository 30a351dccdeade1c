pub mod marker;
pub mod measure;
pub mod scale;

pub use marker::{DisplayId, MarkerBook, MarkerChange, MarkerId, MarkerKind, PriceMarker};
pub use measure::DeltaMeasurement;
pub use scale::{AdaptiveScale, compute_adaptive_scale};

use serde::{Deserialize, Serialize};

/// Kind of view a display shows. Resolved against the host's registry when the display is built.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum VisualizationKind {
    #[default]
    DayRange,
}

impl std::fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisualizationKind::DayRange => write!(f, "Day range"),
        }
    }
}
