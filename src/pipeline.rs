use tracing::error;

use crate::{
    errors::FuelbolError, feed::FeedSource, fuel_station::FeedSnapshot, marker::ClassifiedMarker,
};

/// One marker per feature, in feed order. Features whose coordinates are not a
/// lon/lat pair are dropped without a trace.
pub fn classify_snapshot(snapshot: &FeedSnapshot) -> Vec<ClassifiedMarker> {
    snapshot
        .features
        .iter()
        .filter_map(ClassifiedMarker::from_feature)
        .collect()
}

/// Fetches and classifies one snapshot. Failures are logged and swallowed, the next
/// scheduled refresh is the retry.
pub async fn refresh(source: &dyn FeedSource) -> Option<Vec<ClassifiedMarker>> {
    match source.fetch_snapshot().await {
        Ok(snapshot) => Some(classify_snapshot(&snapshot)),
        Err(e) => {
            error!(
                event = "pipeline.refresh_failed",
                error = %e,
                error_code = e.error_code()
            );
            None
        }
    }
}
