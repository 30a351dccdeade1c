use exchange::{Price, PriceStep};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct DisplayId(pub Uuid);

impl DisplayId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DisplayId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct MarkerId(pub Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Visual weight of a marker line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MarkerKind {
    Small,
    #[default]
    Normal,
    Big,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 3] = [MarkerKind::Small, MarkerKind::Normal, MarkerKind::Big];

    pub fn line_width(self) -> f32 {
        match self {
            MarkerKind::Small => 1.0,
            MarkerKind::Normal => 2.0,
            MarkerKind::Big => 3.0,
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKind::Small => write!(f, "Small"),
            MarkerKind::Normal => write!(f, "Normal"),
            MarkerKind::Big => write!(f, "Big"),
        }
    }
}

/// User annotation anchored to a price, never to a pixel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceMarker {
    pub id: MarkerId,
    pub price: Price,
    pub kind: MarkerKind,
    pub display_id: DisplayId,
}

/// Emitted for every mutation so the host can mirror the list in its own store.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerChange {
    Added(PriceMarker),
    Updated(PriceMarker),
    Removed(PriceMarker),
}

impl MarkerChange {
    pub fn marker(&self) -> &PriceMarker {
        match self {
            MarkerChange::Added(m) | MarkerChange::Updated(m) | MarkerChange::Removed(m) => m,
        }
    }

    /// Replays this change onto another copy of the list.
    pub fn apply_to(&self, markers: &mut Vec<PriceMarker>) {
        match self {
            MarkerChange::Added(marker) => {
                if !markers.iter().any(|m| m.id == marker.id) {
                    markers.push(marker.clone());
                }
            }
            MarkerChange::Updated(marker) => {
                if let Some(existing) = markers.iter_mut().find(|m| m.id == marker.id) {
                    *existing = marker.clone();
                }
            }
            MarkerChange::Removed(marker) => markers.retain(|m| m.id != marker.id),
        }
    }
}

/// Markers of one display.
#[derive(Debug, Clone)]
pub struct MarkerBook {
    display_id: DisplayId,
    markers: Vec<PriceMarker>,
}

impl MarkerBook {
    pub fn new(display_id: DisplayId) -> Self {
        Self {
            display_id,
            markers: Vec::new(),
        }
    }

    /// Restores a persisted list, dropping entries that belong to other displays.
    pub fn from_markers(display_id: DisplayId, markers: Vec<PriceMarker>) -> Self {
        let total = markers.len();
        let markers: Vec<_> = markers
            .into_iter()
            .filter(|m| m.display_id == display_id)
            .collect();

        if markers.len() != total {
            log::warn!(
                "Dropped {} marker(s) not belonging to display {:?}",
                total - markers.len(),
                display_id.0
            );
        }

        Self {
            display_id,
            markers,
        }
    }

    pub fn display_id(&self) -> DisplayId {
        self.display_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: MarkerId) -> Option<&PriceMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Creates a marker at `price` snapped to the nearest `pip`.
    pub fn place(&mut self, price: f64, pip: PriceStep, kind: MarkerKind) -> MarkerChange {
        let marker = PriceMarker {
            id: MarkerId::new(),
            price: Price::from_f64_lossy(price).round_to_step(pip),
            kind,
            display_id: self.display_id,
        };
        log::info!(
            "Marker placed at {} ({kind})",
            marker.price.format_truncated(Price::PRICE_SCALE as u8)
        );

        self.markers.push(marker.clone());
        MarkerChange::Added(marker)
    }

    pub fn set_kind(&mut self, id: MarkerId, kind: MarkerKind) -> Option<MarkerChange> {
        let marker = self.markers.iter_mut().find(|m| m.id == id)?;
        if marker.kind == kind {
            return None;
        }
        marker.kind = kind;
        log::info!("Marker {:?} resized to {kind}", id.0);

        Some(MarkerChange::Updated(marker.clone()))
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<MarkerChange> {
        let idx = self.markers.iter().position(|m| m.id == id)?;
        let marker = self.markers.remove(idx);
        log::info!("Marker {:?} removed", id.0);

        Some(MarkerChange::Removed(marker))
    }
}
