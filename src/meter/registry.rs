use super::render::{self, Layers, View};
use super::surface::Surface;

use data::meter::VisualizationKind;
use rustc_hash::FxHashMap;

/// Something a display can paint. The day range meter is the only one shipped.
pub trait Visualization {
    fn kind(&self) -> VisualizationKind;

    fn paint(&self, surface: &mut dyn Surface, view: &View<'_>, layers: Layers);
}

pub struct DayRangeMeter;

impl Visualization for DayRangeMeter {
    fn kind(&self) -> VisualizationKind {
        VisualizationKind::DayRange
    }

    fn paint(&self, surface: &mut dyn Surface, view: &View<'_>, layers: Layers) {
        render::render(surface, view, layers);
    }
}

pub type Constructor = fn() -> Box<dyn Visualization>;

/// Built once by the host and handed to every display it creates.
#[derive(Default)]
pub struct Registry {
    constructors: FxHashMap<VisualizationKind, Constructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(VisualizationKind::DayRange, || Box::new(DayRangeMeter));
        registry
    }

    pub fn register(&mut self, kind: VisualizationKind, constructor: Constructor) {
        if self.constructors.insert(kind, constructor).is_some() {
            log::warn!("Visualization {kind} registered twice, keeping the latest");
        }
    }

    pub fn resolve(&self, kind: VisualizationKind) -> Option<Box<dyn Visualization>> {
        self.constructors.get(&kind).map(|constructor| constructor())
    }
}
