/// Index of a feature within the interactive data layer.
pub type FeatureIndex = usize;

/// UI input that can change what the map shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// The year slider moved to a new value.
    YearChanged { year: String },
    /// The pointer entered a feature of the data layer.
    PointerEnter { feature: FeatureIndex },
    /// The pointer left a feature of the data layer.
    PointerLeave { feature: FeatureIndex },
}

impl MapEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MapEvent::YearChanged { .. } => "year_changed",
            MapEvent::PointerEnter { .. } => "pointer_enter",
            MapEvent::PointerLeave { .. } => "pointer_leave",
        }
    }
}

/// An event stamped with its position in the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub event: MapEvent,
}

/// Ordered queue of UI events.
///
/// Producers `emit`; the view drains and dispatches in emission order. Nothing
/// here is shared across threads.
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: MapEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { seq, event });
        seq
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, MapEvent};

    #[test]
    fn stamps_events_in_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(MapEvent::PointerEnter { feature: 3 });
        bus.emit(MapEvent::YearChanged {
            year: "2005".to_string(),
        });
        let seqs: Vec<u64> = bus.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(bus.events()[1].event.kind(), "year_changed");
    }

    #[test]
    fn drain_clears_events_but_keeps_sequence() {
        let mut bus = EventBus::new();
        bus.emit(MapEvent::PointerLeave { feature: 0 });
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.is_empty());
        assert_eq!(bus.emit(MapEvent::PointerLeave { feature: 0 }), 1);
    }
}
