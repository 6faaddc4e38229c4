use serde::Deserialize;

use crate::{
    fuel_level::RawLevel,
    location::Location,
    tools::serde::{lenient_string, raw_level_from_any},
};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StationGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_station_name: Option<String>,

    #[serde(default, deserialize_with = "raw_level_from_any")]
    pub level_bsa: RawLevel,

    #[serde(default, deserialize_with = "lenient_string")]
    pub monitoring_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StationFeature {
    #[serde(rename = "type")]
    pub feature_type: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    pub geometry: StationGeometry,

    #[serde(default)]
    pub properties: StationProperties,
}

impl StationFeature {
    /// The station position, or `None` when the coordinates are not exactly
    /// `[longitude, latitude]`.
    pub fn location(&self) -> Option<Location> {
        Location::from_coordinates(&self.geometry.coordinates)
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.fuel_station_name.as_deref()
    }
}

/// One complete download of the fuel level feed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedSnapshot {
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(default)]
    pub features: Vec<StationFeature>,
}

impl FeedSnapshot {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn empty() -> Self {
        FeedSnapshot {
            collection_type: "FeatureCollection".to_string(),
            features: vec![],
        }
    }

    pub fn find_station_by_name(&self, name: &str) -> Option<&StationFeature> {
        self.features.iter().find(|f| f.name() == Some(name))
    }
}
