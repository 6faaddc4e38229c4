use crate::marker::{DetailView, MarkerPlacement};

/// The map renderer and tooltip, seen from the refresh pipeline.
pub trait MarkerSink {
    fn clear_markers(&mut self);
    fn place_marker(&mut self, placement: &MarkerPlacement);
    fn show_detail(&mut self, detail: &DetailView);
    fn hide_detail(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    Cleared,
    Placed(MarkerPlacement),
    DetailShown(DetailView),
    DetailHidden,
}

/// Keeps every event in order. Useful for headless renderers and for tests.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<MarkerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placements(&self) -> impl Iterator<Item = &MarkerPlacement> {
        self.events.iter().filter_map(|event| match event {
            MarkerEvent::Placed(placement) => Some(placement),
            _ => None,
        })
    }

    pub fn take(&mut self) -> Vec<MarkerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl MarkerSink for EventLog {
    fn clear_markers(&mut self) {
        self.events.push(MarkerEvent::Cleared);
    }

    fn place_marker(&mut self, placement: &MarkerPlacement) {
        self.events.push(MarkerEvent::Placed(placement.clone()));
    }

    fn show_detail(&mut self, detail: &DetailView) {
        self.events.push(MarkerEvent::DetailShown(detail.clone()));
    }

    fn hide_detail(&mut self) {
        self.events.push(MarkerEvent::DetailHidden);
    }
}

/// Prints markers to stdout, one line each.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    placed: usize,
}

impl MarkerSink for ConsoleSink {
    fn clear_markers(&mut self) {
        if self.placed > 0 {
            println!("--- {} markers cleared", self.placed);
        }
        self.placed = 0;
    }

    fn place_marker(&mut self, placement: &MarkerPlacement) {
        self.placed += 1;
        println!(
            "{:<14} {:<8} {:>4.1} {}",
            placement.icon(),
            placement.tier,
            placement.opacity,
            placement.id
        );
    }

    fn show_detail(&mut self, detail: &DetailView) {
        println!("{}", detail);
    }

    fn hide_detail(&mut self) {}
}
