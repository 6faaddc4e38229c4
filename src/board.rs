use std::collections::{HashMap, HashSet};

use geojson::{Feature, FeatureCollection};
use tracing::{debug, info};

use crate::{
    marker::{ClassifiedMarker, DetailView, StationId, DIMMED_OPACITY, FULL_OPACITY},
    sink::MarkerSink,
};

/// How one applied snapshot differs from the marker set it replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDiff {
    pub added: Vec<StationId>,
    pub removed: Vec<StationId>,
    pub updated: Vec<StationId>,
    pub unchanged: Vec<StationId>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Current markers keyed by station id, in feed order, plus the tapped station.
///
/// A placement whose id is already on the map updates that marker in place, so
/// re-emitting placements is how opacity changes reach the renderer.
#[derive(Debug, Default)]
pub struct MarkerBoard {
    order: Vec<StationId>,
    markers: HashMap<StationId, ClassifiedMarker>,
    selected: Option<StationId>,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &StationId) -> Option<&ClassifiedMarker> {
        self.markers.get(id)
    }

    pub fn markers(&self) -> impl Iterator<Item = &ClassifiedMarker> {
        self.order.iter().filter_map(|id| self.markers.get(id))
    }

    pub fn selected(&self) -> Option<&StationId> {
        self.selected.as_ref()
    }

    /// Looks a station up by id first, then by display name.
    pub fn find(&self, query: &str) -> Option<&ClassifiedMarker> {
        self.markers
            .get(&StationId::new(query))
            .or_else(|| self.markers().find(|m| m.display_name == query))
    }

    /// Replaces every marker with `markers`. The sink sees a clear followed by one
    /// placement per marker, so old and new markers are never mixed on the map.
    pub fn apply(&mut self, markers: Vec<ClassifiedMarker>, sink: &mut dyn MarkerSink) -> MarkerDiff {
        let mut previous = std::mem::take(&mut self.markers);
        let mut seen: HashMap<StationId, usize> = HashMap::new();
        let mut placed: HashSet<StationId> = HashSet::new();
        let mut diff = MarkerDiff::default();

        self.order.clear();
        for mut marker in markers {
            // A repeated id gets the next ordinal suffix no other marker in this snapshot uses
            if placed.contains(&marker.id) {
                let base = marker.id.clone();
                let ordinal = seen.entry(base.clone()).or_insert(1);
                marker.id = loop {
                    *ordinal += 1;
                    let candidate = base.with_ordinal(*ordinal);
                    if !placed.contains(&candidate) {
                        break candidate;
                    }
                };
            }
            placed.insert(marker.id.clone());

            match previous.remove(&marker.id) {
                Some(old) if old.same_reading(&marker) => diff.unchanged.push(marker.id.clone()),
                Some(_) => diff.updated.push(marker.id.clone()),
                None => diff.added.push(marker.id.clone()),
            }

            self.order.push(marker.id.clone());
            self.markers.insert(marker.id.clone(), marker);
        }

        diff.removed = previous.into_keys().collect();
        diff.removed.sort();

        let selection_lost = self
            .selected
            .as_ref()
            .is_some_and(|id| !self.markers.contains_key(id));
        if selection_lost {
            debug!(event = "board.selection_dropped", station = ?self.selected);
            self.selected = None;
            sink.hide_detail();
        }

        sink.clear_markers();
        self.place_all(sink);

        if let Some(detail) = self.selected_detail() {
            sink.show_detail(&detail);
        }

        info!(
            event = "board.snapshot_applied",
            markers = self.order.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            updated = diff.updated.len()
        );

        diff
    }

    /// Resolves a tap. The tapped marker stays opaque and every other one is dimmed.
    /// Unknown ids leave the board untouched.
    pub fn select(&mut self, id: &StationId, sink: &mut dyn MarkerSink) -> Option<DetailView> {
        if !self.markers.contains_key(id) {
            debug!(event = "board.select_unknown", station = %id);
            return None;
        }

        self.selected = Some(id.clone());
        self.place_all(sink);

        let detail = self.selected_detail()?;
        sink.show_detail(&detail);
        Some(detail)
    }

    /// A tap on the empty map: everything back to full opacity, tooltip closed.
    pub fn clear_selection(&mut self, sink: &mut dyn MarkerSink) {
        if self.selected.take().is_some() {
            self.place_all(sink);
        }
        sink.hide_detail();
    }

    pub fn feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.markers().map(Feature::from).collect(),
            foreign_members: None,
        }
    }

    fn selected_detail(&self) -> Option<DetailView> {
        let id = self.selected.as_ref()?;
        self.markers.get(id).map(|marker| marker.detail_view())
    }

    fn opacity_for(&self, id: &StationId) -> f64 {
        match &self.selected {
            Some(selected) if selected != id => DIMMED_OPACITY,
            _ => FULL_OPACITY,
        }
    }

    fn place_all(&self, sink: &mut dyn MarkerSink) {
        for marker in self.markers() {
            sink.place_marker(&marker.placement(self.opacity_for(&marker.id)));
        }
    }
}
