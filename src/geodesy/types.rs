use serde::{Deserialize, Serialize};
use std::fmt;

/// A geodetic position. Latitude and longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }

    /// A point on the surface (altitude 0), as used for launch sites.
    pub fn surface(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(lat_deg, lon_deg, 0.0)
    }

    pub fn lat_rad(&self) -> f64 {
        self.lat_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.lon_deg.to_radians()
    }

    pub fn is_finite(&self) -> bool {
        self.lat_deg.is_finite() && self.lon_deg.is_finite() && self.alt_m.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {} m)", self.lat_deg, self.lon_deg, self.alt_m)
    }
}

/// Relative geometry of point B as seen from point A.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionInfo {
    pub angle_at_centre_deg: f64,
    pub angle_at_centre_rad: f64,
    /// Surface distance along the sphere, ignoring altitude.
    pub great_circle_distance_m: f64,
    /// Chord length between the two altitude-adjusted points.
    pub straight_distance_m: f64,
    /// Initial course from A to B, in [0, 360).
    pub bearing_deg: f64,
    pub bearing_rad: f64,
    pub elevation_deg: f64,
    pub elevation_rad: f64,
}
