use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the map in WGS84 degrees.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Location {
        Location {
            longitude: lon,
            latitude: lat,
        }
    }

    /// Builds a location from a GeoJSON position. Anything other than exactly
    /// `[longitude, latitude]` is rejected.
    pub fn from_coordinates(coordinates: &[f64]) -> Option<Location> {
        match coordinates {
            [lon, lat] => Some(Location::new(*lon, *lat)),
            _ => None,
        }
    }

    pub fn coordinates(&self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_coordinates_requires_two_elements() {
        assert_eq!(
            Location::from_coordinates(&[-66.1, -17.3]),
            Some(Location::new(-66.1, -17.3))
        );
        assert!(Location::from_coordinates(&[]).is_none());
        assert!(Location::from_coordinates(&[-66.1]).is_none());
        assert!(Location::from_coordinates(&[-66.1, -17.3, 2500.0]).is_none());
    }

    #[test]
    fn display_uses_lon_lat_order() {
        let location = Location::new(-68.119293, -16.489689);
        assert_eq!(location.to_string(), "-68.119293,-16.489689");
    }
}
