use runtime::{EventBus, FeatureIndex, MapEvent};
use tracing::debug;

use crate::choropleth::ChoroplethLayer;
use crate::interaction::{
    HoverHighlight, InteractionHandler, LegendTitle, UnhoverRestore, YearRecolor,
};
use crate::legend::Legend;
use crate::overlay::OverlayLayer;
use crate::slider::YearSlider;

/// Which corner set the controls use.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}

/// Everything interaction handlers may change.
pub struct MapState {
    pub choropleth: ChoroplethLayer,
    pub overlays: Vec<OverlayLayer>,
    pub legend: Legend,
    pub slider: YearSlider,
}

/// A built map plus its event queue and registered handlers.
pub struct MapView {
    state: MapState,
    handlers: Vec<Box<dyn InteractionHandler>>,
    bus: EventBus,
    device: Device,
}

impl MapView {
    pub fn new(state: MapState) -> Self {
        Self {
            state,
            handlers: Vec::new(),
            bus: EventBus::new(),
            device: Device::default(),
        }
    }

    /// A view with hover highlight, unhover restore, year recolor and legend
    /// title handlers registered in that order.
    pub fn with_default_handlers(state: MapState) -> Self {
        let mut view = Self::new(state);
        view.register(Box::new(HoverHighlight));
        view.register(Box::new(UnhoverRestore));
        view.register(Box::new(YearRecolor));
        view.register(Box::new(LegendTitle));
        view
    }

    pub fn register(&mut self, handler: Box<dyn InteractionHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn emit(&mut self, event: MapEvent) -> u64 {
        self.bus.emit(event)
    }

    pub fn pending(&self) -> usize {
        self.bus.events().len()
    }

    /// Drains queued events in order and hands each one to every handler in
    /// registration order. Returns the number of events processed.
    pub fn dispatch(&mut self) -> usize {
        let events = self.bus.drain();
        for e in &events {
            debug!(seq = e.seq, kind = e.event.kind(), "dispatching map event");
            for handler in &mut self.handlers {
                handler.handle(&e.event, &mut self.state);
            }
        }
        events.len()
    }

    pub fn select_year(&mut self, year: &str) {
        self.emit(MapEvent::YearChanged {
            year: year.to_string(),
        });
        self.dispatch();
    }

    pub fn pointer_enter(&mut self, feature: FeatureIndex) {
        self.emit(MapEvent::PointerEnter { feature });
        self.dispatch();
    }

    pub fn pointer_leave(&mut self, feature: FeatureIndex) {
        self.emit(MapEvent::PointerLeave { feature });
        self.dispatch();
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn choropleth(&self) -> &ChoroplethLayer {
        &self.state.choropleth
    }

    pub fn overlays(&self) -> &[OverlayLayer] {
        &self.state.overlays
    }

    pub fn legend(&self) -> &Legend {
        &self.state.legend
    }

    pub fn slider(&self) -> &YearSlider {
        &self.state.slider
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn set_device(&mut self, device: Device) {
        self.device = device;
    }

    pub fn year(&self) -> &str {
        self.state.slider.current()
    }
}
