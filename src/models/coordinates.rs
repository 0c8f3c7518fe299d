use crate::constants::EARTH_RADIUS_METERS;
use geo::Coord;
use serde::{Deserialize, Serialize};

/// Geographic position. Serialized as a `[lat, lng]` pair, the order every
/// caller of the planner uses (GeoJSON geometry stays `[lng, lat]`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Coordinates { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Build from a GeoJSON position (`[lng, lat, ...]`).
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(Coordinates {
                lat: *lat,
                lng: *lng,
            }),
            _ => None,
        }
    }

    /// Planar coordinate with `x = lng`, `y = lat`.
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    pub fn from_coord(coord: Coord<f64>) -> Self {
        Coordinates {
            lat: coord.y,
            lng: coord.x,
        }
    }

    /// GeoJSON position (`[lng, lat]`).
    pub fn to_position(self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// `lat:lng` key with a fixed number of decimals, for set membership.
    pub fn key(&self, decimal_places: usize) -> String {
        format!(
            "{:.prec$}:{:.prec$}",
            self.lat,
            self.lng,
            prec = decimal_places
        )
    }

    /// Midpoint in coordinate space (fine for the short spans inside a building)
    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }
}
