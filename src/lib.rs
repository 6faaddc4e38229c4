pub mod board;
pub mod config;
pub mod errors;
pub mod feed;
pub mod format;
pub mod fuel_level;
pub mod fuel_station;
pub mod location;
pub mod logging;
pub mod marker;
pub mod pipeline;
pub mod poller;
pub mod service;
pub mod severity;
pub mod sink;
pub mod tools;

pub use board::{MarkerBoard, MarkerDiff};
pub use feed::{FeedClient, FeedSource};
pub use fuel_station::FeedSnapshot;
pub use logging::init_logging;
pub use marker::{ClassifiedMarker, DetailView, MarkerPlacement, StationId};
pub use service::RefreshService;
pub use severity::SeverityTier;
pub use sink::MarkerSink;
