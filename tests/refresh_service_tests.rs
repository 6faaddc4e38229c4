extern crate fuelbol;

use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fuelbol::errors::FeedError;
use fuelbol::feed::FeedSource;
use fuelbol::fuel_station::FeedSnapshot;
use fuelbol::poller::Schedule;
use fuelbol::sink::{EventLog, MarkerEvent};
use fuelbol::{RefreshService, SeverityTier, StationId};
use tokio::time;

fn read_mock_data(name: &str) -> String {
    fs::read_to_string(format!("mock/{}", name)).unwrap()
}

fn station_feed(stations: &[(&str, &str)]) -> FeedSnapshot {
    let features: Vec<String> = stations
        .iter()
        .enumerate()
        .map(|(i, (name, level))| {
            format!(
                r#"{{
                    "type": "Feature",
                    "geometry": {{ "type": "Point", "coordinates": [-66.{}, -17.3] }},
                    "properties": {{ "fuelStationName": "{}", "levelBsa": "{}", "monitoringAt": "2024-01-01T10:00:00" }}
                }}"#,
                i, name, level
            )
        })
        .collect();

    FeedSnapshot::from_json(&format!(
        r#"{{ "type": "FeatureCollection", "features": [{}] }}"#,
        features.join(",")
    ))
    .unwrap()
}

/// Answers each fetch with the next scripted reply after the scripted delay.
struct ScriptedFeed {
    replies: Mutex<VecDeque<(Duration, Option<FeedSnapshot>)>>,
}

impl ScriptedFeed {
    fn new(replies: Vec<(Duration, Option<FeedSnapshot>)>) -> Arc<Self> {
        Arc::new(ScriptedFeed {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl FeedSource for ScriptedFeed {
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot, FeedError> {
        let (delay, reply) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((Duration::ZERO, None));

        time::sleep(delay).await;

        reply.ok_or_else(|| FeedError::Decode {
            source: serde_json::from_str::<FeedSnapshot>("not json").unwrap_err(),
        })
    }
}

fn every_ten_minutes() -> Schedule {
    Schedule {
        interval: Duration::from_secs(10 * 60),
        align_to_wall_clock: false,
        fire_immediately: true,
    }
}

fn marker_names(events: &[MarkerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            MarkerEvent::Placed(placement) => Some(placement.id.to_string()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn first_tick_fills_the_map() {
    let snapshot = FeedSnapshot::from_json(&read_mock_data("fuel_levels.json")).unwrap();
    let feed = ScriptedFeed::new(vec![(Duration::from_secs(2), Some(snapshot))]);

    let service = RefreshService::spawn(every_ten_minutes(), feed, EventLog::new());
    time::sleep(Duration::from_secs(5)).await;

    let markers = service.markers().await;
    assert_eq!(markers.len(), 6);

    let state = service.shutdown().await.unwrap();
    assert_eq!(state.last_generation(), Some(0));
    assert_eq!(state.sink().placements().count(), 6);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_markers_until_next_tick() {
    let feed = ScriptedFeed::new(vec![
        (Duration::from_secs(1), Some(station_feed(&[("a", "20000"), ("b", "100")]))),
        (Duration::from_secs(1), None),
        (Duration::from_secs(1), Some(station_feed(&[("c", "7000")]))),
    ]);

    let service = RefreshService::spawn(every_ten_minutes(), feed, EventLog::new());

    time::sleep(Duration::from_secs(11 * 60)).await;
    let names: Vec<_> = service.markers().await.into_iter().map(|m| m.display_name).collect();
    assert_eq!(names, vec!["a", "b"]);

    time::sleep(Duration::from_secs(10 * 60)).await;
    let markers = service.markers().await;
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].display_name, "c");
    assert_eq!(markers[0].tier, SeverityTier::Warning);

    let state = service.shutdown().await.unwrap();
    assert_eq!(state.last_generation(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn late_completion_does_not_roll_back() {
    // Tick 0 is slow and lands after tick 1, which already brought newer data
    let feed = ScriptedFeed::new(vec![
        (Duration::from_secs(15 * 60), Some(station_feed(&[("old", "100")]))),
        (Duration::from_secs(60), Some(station_feed(&[("new", "20000")]))),
    ]);

    let service = RefreshService::spawn(every_ten_minutes(), feed, EventLog::new());
    time::sleep(Duration::from_secs(16 * 60)).await;

    let names: Vec<_> = service.markers().await.into_iter().map(|m| m.display_name).collect();
    assert_eq!(names, vec!["new"]);

    let state = service.shutdown().await.unwrap();
    assert_eq!(state.last_generation(), Some(1));
    assert!(!marker_names(&state.sink().events).iter().any(|id| id.starts_with("old")));
}

#[tokio::test(start_paused = true)]
async fn taps_resolve_by_station_id() {
    let feed = ScriptedFeed::new(vec![(
        Duration::from_secs(1),
        Some(station_feed(&[("a", "20000"), ("b", "4999")])),
    )]);

    let service = RefreshService::spawn(every_ten_minutes(), feed, EventLog::new());
    time::sleep(Duration::from_secs(5)).await;

    let markers = service.markers().await;
    let b = markers.iter().find(|m| m.display_name == "b").unwrap().id.clone();

    let detail = service.select(b).await.unwrap();
    assert_eq!(detail.display_name, "b");
    assert_eq!(detail.level_line(), "4.999 [Liters] (Approx.)");
    assert_eq!(detail.tier_color, "#FF0000");

    assert!(service.select(StationId::new("missing")).await.is_none());

    service.clear_selection();
    let state = service.shutdown().await.unwrap();
    assert!(state.board().selected().is_none());
    assert_eq!(state.sink().events.last(), Some(&MarkerEvent::DetailHidden));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_in_flight_fetch() {
    let feed = ScriptedFeed::new(vec![(
        Duration::from_secs(60),
        Some(station_feed(&[("a", "20000")])),
    )]);

    let service = RefreshService::spawn(every_ten_minutes(), feed, EventLog::new());
    time::sleep(Duration::from_secs(10)).await;

    let state = service.shutdown().await.unwrap();
    time::sleep(Duration::from_secs(120)).await;

    assert!(state.board().is_empty());
    assert_eq!(state.last_generation(), None);
}
