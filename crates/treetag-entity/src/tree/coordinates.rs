//! Physical placement of a field record.

use serde::{Deserialize, Serialize};

/// Mean earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal-degree position plus a free-text location label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Location label (the linked location's name when one is set).
    pub location: String,
}

impl Coordinates {
    /// Haversine distance to another point, in kilometers.
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), latitude.to_radians());
        let d_lat = (latitude - self.latitude).to_radians();
        let d_lon = (longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}
