use super::render::RenderConfig;
use super::{Interaction, ScaleFactor};
use crate::meter::{DisplayId, MarkerChange, PriceMarker, VisualizationKind};
use crate::util::ok_or_default;

use serde::{Deserialize, Serialize};

/// One meter on screen and the markers the user left on it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplaySpec {
    pub id: DisplayId,
    pub symbol: String,
    #[serde(deserialize_with = "ok_or_default", default)]
    pub kind: VisualizationKind,
    #[serde(deserialize_with = "ok_or_default", default)]
    pub markers: Vec<PriceMarker>,
}

impl DisplaySpec {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            id: DisplayId::new(),
            symbol: symbol.into(),
            kind: VisualizationKind::default(),
            markers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct State {
    #[serde(deserialize_with = "ok_or_default")]
    pub render: RenderConfig,
    #[serde(deserialize_with = "ok_or_default")]
    pub interaction: Interaction,
    #[serde(deserialize_with = "ok_or_default")]
    pub scale_factor: ScaleFactor,
    pub displays: Vec<DisplaySpec>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            interaction: Interaction::default(),
            scale_factor: ScaleFactor::default(),
            displays: ["EURUSD", "USDJPY", "XAUUSD"]
                .into_iter()
                .map(DisplaySpec::new)
                .collect(),
        }
    }
}

impl State {
    /// Mirrors a marker notification into the persisted list of its display.
    pub fn apply_marker_change(&mut self, change: &MarkerChange) -> bool {
        let display_id = change.marker().display_id;

        match self.displays.iter_mut().find(|d| d.id == display_id) {
            Some(display) => {
                change.apply_to(&mut display.markers);
                true
            }
            None => {
                log::warn!("Marker change for unknown display {:?}", display_id.0);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{MarkerBook, MarkerKind};
    use exchange::PriceStep;

    #[test]
    fn marker_changes_reach_the_right_display() {
        let mut state = State::default();
        let target = state.displays[1].id;
        let mut book = MarkerBook::new(target);
        let pip = PriceStep::from_f64(0.01).unwrap();

        let added = book.place(151.234, pip, MarkerKind::Big);
        assert!(state.apply_marker_change(&added));

        assert!(state.displays[0].markers.is_empty());
        assert_eq!(state.displays[1].markers.len(), 1);

        let removed = book.remove(added.marker().id).unwrap();
        assert!(state.apply_marker_change(&removed));
        assert!(state.displays[1].markers.is_empty());
    }

    #[test]
    fn unknown_display_is_ignored() {
        let mut state = State::default();
        let mut book = MarkerBook::new(DisplayId::new());
        let pip = PriceStep::from_f64(0.0001).unwrap();

        let change = book.place(1.1, pip, MarkerKind::Small);

        assert!(!state.apply_marker_change(&change));
    }

    #[test]
    fn broken_sections_load_as_defaults() {
        let json = r#"{
            "render": 42,
            "scale_factor": 1.2,
            "displays": [{
                "id": "6f1c1b2e-4a0f-4b7e-9a55-0d1f2c3b4a59",
                "symbol": "EURUSD",
                "markers": {}
            }]
        }"#;
        let state: State = serde_json::from_str(json).unwrap();

        assert_eq!(state.render, RenderConfig::default());
        assert_eq!(f32::from(state.scale_factor), 1.2);
        assert_eq!(state.displays.len(), 1);
        assert!(state.displays[0].markers.is_empty());
    }
}
