use std::fmt;

use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use serde::{Deserialize, Serialize};

use crate::{
    format::{format_level, format_timestamp},
    fuel_station::StationFeature,
    location::Location,
    severity::SeverityTier,
};

pub const FULL_OPACITY: f64 = 1.0;
pub const DIMMED_OPACITY: f64 = 0.1;

const UNAVAILABLE: &str = "N/A";

/// Stable key of a station across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        StationId(id.into())
    }

    /// The feature id when the feed sends one, otherwise `name@lon,lat`.
    pub fn for_feature(feature: &StationFeature, location: &Location) -> Self {
        match &feature.id {
            Some(id) => StationId::new(id.clone()),
            None => StationId(format!(
                "{}@{}",
                feature.name().unwrap_or(UNAVAILABLE),
                location
            )),
        }
    }

    /// Disambiguates the n-th repeat of an id within one snapshot.
    pub fn with_ordinal(&self, ordinal: usize) -> Self {
        StationId(format!("{}#{}", self.0, ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station ready to be drawn, derived from one feed feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedMarker {
    pub id: StationId,
    pub position: Location,
    pub tier: SeverityTier,
    pub display_name: String,
    pub raw_level: String,
    pub last_update: String,
}

impl ClassifiedMarker {
    /// Returns `None` for features whose coordinates are not a lon/lat pair.
    pub fn from_feature(feature: &StationFeature) -> Option<ClassifiedMarker> {
        let position = feature.location()?;
        let properties = &feature.properties;
        let level = properties.level_bsa.fuel_level();

        Some(ClassifiedMarker {
            id: StationId::for_feature(feature, &position),
            position,
            tier: SeverityTier::classify(level.as_ref()),
            display_name: feature.name().unwrap_or(UNAVAILABLE).to_string(),
            raw_level: properties.level_bsa.to_string(),
            last_update: properties
                .monitoring_at
                .clone()
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
        })
    }

    pub fn placement(&self, opacity: f64) -> MarkerPlacement {
        MarkerPlacement {
            id: self.id.clone(),
            position: self.position,
            tier: self.tier,
            opacity,
        }
    }

    pub fn detail_view(&self) -> DetailView {
        DetailView {
            display_name: self.display_name.clone(),
            formatted_level: format_level(&self.raw_level),
            formatted_timestamp: format_timestamp(&self.last_update),
            tier_color: self.tier.color(),
        }
    }

    /// Same station, same reading. Used to tell updated markers from unchanged ones.
    pub fn same_reading(&self, other: &ClassifiedMarker) -> bool {
        self.position == other.position
            && self.tier == other.tier
            && self.display_name == other.display_name
            && self.raw_level == other.raw_level
            && self.last_update == other.last_update
    }
}

impl From<&ClassifiedMarker> for Feature {
    fn from(marker: &ClassifiedMarker) -> Feature {
        let geometry = Geometry::new(Value::Point(marker.position.coordinates()));
        let detail = marker.detail_view();

        let mut properties = JsonObject::new();
        properties.insert("fuelStationName".to_string(), JsonValue::from(marker.display_name.clone()));
        properties.insert("levelBsa".to_string(), JsonValue::from(marker.raw_level.clone()));
        properties.insert("monitoringAt".to_string(), JsonValue::from(marker.last_update.clone()));
        properties.insert("tier".to_string(), JsonValue::from(marker.tier.as_str()));
        properties.insert("icon".to_string(), JsonValue::from(marker.tier.icon()));
        properties.insert("color".to_string(), JsonValue::from(marker.tier.color()));
        properties.insert("formattedLevel".to_string(), JsonValue::from(detail.formatted_level));
        properties.insert("formattedTimestamp".to_string(), JsonValue::from(detail.formatted_timestamp));

        Feature {
            bbox: None,
            geometry: Some(geometry),
            id: Some(geojson::feature::Id::String(marker.id.to_string())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// What the map renderer needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub id: StationId,
    pub position: Location,
    pub tier: SeverityTier,
    pub opacity: f64,
}

impl MarkerPlacement {
    pub fn icon(&self) -> &'static str {
        self.tier.icon()
    }
}

/// Pre-formatted content of the tap tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub display_name: String,
    pub formatted_level: String,
    pub formatted_timestamp: String,
    pub tier_color: &'static str,
}

impl DetailView {
    pub fn level_line(&self) -> String {
        format!("{} [Liters] (Approx.)", self.formatted_level)
    }

    pub fn update_line(&self) -> String {
        format!("Last update: {}", self.formatted_timestamp)
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.display_name)?;
        writeln!(f, "{}", self.level_line())?;
        write!(f, "{}", self.update_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(raw: &str) -> StationFeature {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn classify_feature() {
        let feature = feature(
            r#"{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-66.1, -17.3] },
                "properties": {
                    "fuelStationName": "A",
                    "levelBsa": 20000,
                    "monitoringAt": "2024-01-01T10:00:00"
                }
            }"#,
        );

        let marker = ClassifiedMarker::from_feature(&feature).unwrap();
        assert_eq!(marker.tier, SeverityTier::Normal);
        assert_eq!(marker.display_name, "A");
        assert_eq!(marker.raw_level, "20000");
        assert_eq!(marker.id.as_str(), "A@-66.100000,-17.300000");

        let detail = marker.detail_view();
        assert_eq!(detail.level_line(), "20.000 [Liters] (Approx.)");
        assert_eq!(detail.update_line(), "Last update: January 1, 2024 at 10:00 AM");
        assert_eq!(detail.tier_color, "#00FF00");
    }

    #[test]
    fn missing_properties_degrade() {
        let feature = feature(
            r#"{
                "type": "Feature",
                "id": "st-9",
                "geometry": { "type": "Point", "coordinates": [-63.2, -17.8] },
                "properties": {}
            }"#,
        );

        let marker = ClassifiedMarker::from_feature(&feature).unwrap();
        assert_eq!(marker.id.as_str(), "st-9");
        assert_eq!(marker.tier, SeverityTier::Critical);
        assert_eq!(marker.display_name, "N/A");

        let detail = marker.detail_view();
        assert_eq!(detail.formatted_level, "N/A");
        assert_eq!(detail.formatted_timestamp, "N/A");
    }

    #[test]
    fn as_geojson_feature() {
        let feature = feature(
            r#"{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-66.1, -17.3] },
                "properties": { "fuelStationName": "B", "levelBsa": "7000" }
            }"#,
        );

        let marker = ClassifiedMarker::from_feature(&feature).unwrap();
        let feature = Feature::from(&marker);
        assert_eq!(feature.property("tier"), Some(&JsonValue::from("warning")));
        assert_eq!(feature.property("color"), Some(&JsonValue::from("#FF8C00")));
        assert_eq!(feature.property("formattedLevel"), Some(&JsonValue::from("7.000")));
    }
}
