use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    board::{MarkerBoard, MarkerDiff},
    feed::FeedSource,
    marker::{ClassifiedMarker, DetailView, StationId},
    pipeline::refresh,
    poller::{Poller, Schedule},
    sink::MarkerSink,
};

/// The board and its renderer, mutated from one place only.
///
/// Every fetch carries the generation of the tick that started it. A completion
/// that is not newer than the last applied one is dropped, so overlapping fetches
/// that finish out of order never roll the map back.
#[derive(Debug)]
pub struct MapState<S> {
    board: MarkerBoard,
    sink: S,
    last_generation: Option<u64>,
}

impl<S: MarkerSink> MapState<S> {
    pub fn new(sink: S) -> Self {
        MapState {
            board: MarkerBoard::new(),
            sink,
            last_generation: None,
        }
    }

    pub fn board(&self) -> &MarkerBoard {
        &self.board
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn last_generation(&self) -> Option<u64> {
        self.last_generation
    }

    /// Returns `None` when the completion is stale and was discarded.
    pub fn apply_refresh(&mut self, generation: u64, markers: Vec<ClassifiedMarker>) -> Option<MarkerDiff> {
        if self.last_generation.is_some_and(|last| generation <= last) {
            debug!(
                event = "service.stale_refresh_dropped",
                generation = generation,
                last_generation = self.last_generation
            );
            return None;
        }

        self.last_generation = Some(generation);
        let diff = self.board.apply(markers, &mut self.sink);
        if diff.is_empty() {
            debug!(event = "service.refresh_unchanged", generation = generation);
        }
        Some(diff)
    }

    pub fn select(&mut self, id: &StationId) -> Option<DetailView> {
        self.board.select(id, &mut self.sink)
    }

    pub fn clear_selection(&mut self) {
        self.board.clear_selection(&mut self.sink)
    }
}

enum Command {
    Refreshed {
        generation: u64,
        markers: Vec<ClassifiedMarker>,
    },
    Select {
        id: StationId,
        reply: oneshot::Sender<Option<DetailView>>,
    },
    ClearSelection,
    Markers {
        reply: oneshot::Sender<Vec<ClassifiedMarker>>,
    },
    Shutdown,
}

/// Polls the feed and keeps a [`MarkerSink`] in sync with it.
pub struct RefreshService<S> {
    commands: mpsc::UnboundedSender<Command>,
    poller: Poller,
    owner: JoinHandle<MapState<S>>,
}

impl<S> RefreshService<S>
where
    S: MarkerSink + Send + 'static,
{
    /// Starts the owner task and the poller. Must be called from within a tokio runtime.
    pub fn spawn(schedule: Schedule, source: Arc<dyn FeedSource>, sink: S) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let owner = tokio::spawn(run_owner(MapState::new(sink), receiver));

        let mut poller = Poller::new(schedule);
        let tick_commands = commands.clone();
        poller.start(move |generation| {
            let source = source.clone();
            let commands = tick_commands.clone();
            async move {
                if let Some(markers) = refresh(source.as_ref()).await {
                    // The owner is gone only during shutdown
                    let _ = commands.send(Command::Refreshed {
                        generation,
                        markers,
                    });
                }
            }
        });

        info!(event = "service.started");

        RefreshService {
            commands,
            poller,
            owner,
        }
    }

    /// A tap on a marker.
    pub async fn select(&self, id: StationId) -> Option<DetailView> {
        let (reply, response) = oneshot::channel();
        self.commands.send(Command::Select { id, reply }).ok()?;
        response.await.ok().flatten()
    }

    /// A tap on the empty map.
    pub fn clear_selection(&self) {
        let _ = self.commands.send(Command::ClearSelection);
    }

    /// The markers currently on the map, in feed order.
    pub async fn markers(&self) -> Vec<ClassifiedMarker> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Command::Markers { reply }).is_err() {
            return vec![];
        }
        response.await.unwrap_or_default()
    }

    /// Stops polling, cancels fetches still in flight and hands back the final state.
    pub async fn shutdown(self) -> Option<MapState<S>> {
        let RefreshService {
            commands,
            mut poller,
            owner,
        } = self;

        poller.stop();
        let _ = commands.send(Command::Shutdown);
        let state = owner.await.ok();
        info!(event = "service.stopped");
        state
    }
}

async fn run_owner<S: MarkerSink>(
    mut state: MapState<S>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) -> MapState<S> {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Refreshed {
                generation,
                markers,
            } => {
                state.apply_refresh(generation, markers);
            }
            Command::Select { id, reply } => {
                let _ = reply.send(state.select(&id));
            }
            Command::ClearSelection => state.clear_selection(),
            Command::Markers { reply } => {
                let _ = reply.send(state.board.markers().cloned().collect());
            }
            Command::Shutdown => break,
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{location::Location, severity::SeverityTier, sink::EventLog};

    fn marker(id: &str) -> ClassifiedMarker {
        ClassifiedMarker {
            id: StationId::new(id),
            position: Location::new(-68.1, -16.5),
            tier: SeverityTier::Normal,
            display_name: id.to_string(),
            raw_level: "20000".to_string(),
            last_update: "2024-01-01T10:00:00".to_string(),
        }
    }

    #[test]
    fn stale_generations_are_dropped() {
        let mut state = MapState::new(EventLog::new());

        assert!(state.apply_refresh(1, vec![marker("new")]).is_some());
        assert!(state.apply_refresh(0, vec![marker("old")]).is_none());
        assert!(state.apply_refresh(1, vec![marker("again")]).is_none());

        assert_eq!(state.last_generation(), Some(1));
        let ids: Vec<_> = state.board().markers().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn identical_refresh_yields_empty_diff() {
        let mut state = MapState::new(EventLog::new());
        state.apply_refresh(0, vec![marker("a"), marker("b")]);

        let diff = state.apply_refresh(1, vec![marker("a"), marker("b")]).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged.len(), 2);

        let mut changed = marker("b");
        changed.raw_level = "4000".to_string();
        let diff = state.apply_refresh(2, vec![marker("a"), changed]).unwrap();
        assert!(!diff.is_empty());
    }

    #[test]
    fn first_refresh_is_always_applied() {
        let mut state = MapState::new(EventLog::new());
        assert!(state.apply_refresh(7, vec![]).is_some());
        assert_eq!(state.last_generation(), Some(7));
    }
}
