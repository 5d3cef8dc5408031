//! Spherical-earth geometry for the location search
//!
//! Distances use the haversine formula on a sphere of mean earth radius.
//! No datum correction is performed.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Mean earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SearchError::invalid(
                "latitude",
                format!("{} is not within [-90, 90]", latitude),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SearchError::invalid(
                "longitude",
                format!("{} is not within [-180, 180]", longitude),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Combine an optional latitude and longitude.
    ///
    /// Both or neither must be present; a lone half names the missing one.
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, SearchError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            (Some(_), None) => Err(SearchError::invalid(
                "longitude",
                "latitude was given without longitude",
            )),
            (None, Some(_)) => Err(SearchError::invalid(
                "latitude",
                "longitude was given without latitude",
            )),
            (None, None) => Ok(None),
        }
    }

    /// Great-circle distance to another point in kilometres
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Compass bearings used to size the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    fn bearing_radians(self) -> f64 {
        match self {
            Direction::North => 0.0,
            Direction::East => 90f64.to_radians(),
            Direction::South => 180f64.to_radians(),
            Direction::West => 270f64.to_radians(),
        }
    }
}

/// Haversine distance between two points in kilometres
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Point reached by travelling `distance_km` from `origin` on an initial bearing.
///
/// Longitude is normalised into [-180, 180).
pub fn destination_point(origin: &Coordinate, distance_km: f64, direction: Direction) -> Coordinate {
    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = direction.bearing_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinate {
        latitude: lat2.to_degrees(),
        longitude: normalize_longitude(lon2.to_degrees()),
    }
}

/// Wrap a longitude into [-180, 180)
pub fn normalize_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// Slack on every box edge (about 1 cm) so points exactly on the circle
/// are not lost to rounding in the edge computation
const BOX_PADDING_DEG: f64 = 1e-7;

/// Inclusive latitude/longitude rectangle used as a coarse prune
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    /// The whole globe
    pub const WORLD: BoundingBox = BoundingBox {
        south: -90.0,
        north: 90.0,
        west: -180.0,
        east: 180.0,
    };

    /// Box enclosing every point within `radius_km` of `origin`.
    ///
    /// A radius reaching over a pole opens the box to the whole globe, since
    /// every meridian passes through the circle. A radius crossing the
    /// antimeridian opens the longitude range to [-180, 180].
    pub fn around(origin: &Coordinate, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let reach = angular.to_degrees() + BOX_PADDING_DEG;

        // Due north/south before folding back over the pole
        if origin.latitude + reach > 90.0 || origin.latitude - reach < -90.0 {
            return Self::WORLD;
        }

        let north =
            destination_point(origin, radius_km, Direction::North).latitude + BOX_PADDING_DEG;
        let south =
            destination_point(origin, radius_km, Direction::South).latitude - BOX_PADDING_DEG;

        // Meridians tangent to the circle. The due east/west destination
        // points sit slightly inside them away from the equator.
        let ratio = angular.sin() / origin.latitude.to_radians().cos();
        if ratio >= 1.0 {
            return Self {
                south,
                north,
                ..Self::WORLD
            };
        }
        let half_width = ratio.asin().to_degrees() + BOX_PADDING_DEG;

        let mut west = normalize_longitude(origin.longitude - half_width);
        let mut east = normalize_longitude(origin.longitude + half_width);
        // A west edge landing exactly on -180 still has to see records stored at +180
        if west > east || west <= -180.0 {
            west = -180.0;
            east = 180.0;
        }

        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Whether the box spans every longitude
    pub fn spans_all_longitudes(&self) -> bool {
        self.west <= -180.0 && self.east >= 180.0
    }

    /// Inclusive containment test
    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }
}
