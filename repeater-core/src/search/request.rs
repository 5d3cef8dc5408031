//! Query types and validation
//!
//! `LocationQuery` and `CallsignQuery` are only constructed through
//! validating builders, so the engine never sees a half-formed query.
//! `SearchRequest` is the loose shape a chat tool call arrives in.

use serde::{Deserialize, Serialize};

use super::filter::{BandFilter, ModeFilter};
use super::geo::Coordinate;
use crate::error::SearchError;

/// Default radius for location searches
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 80.0;

/// Nearby-repeater search around an origin
#[derive(Debug, Clone)]
pub struct LocationQuery {
    origin: Coordinate,
    max_distance_km: f64,
    modes: Option<ModeFilter>,
    bands: Option<BandFilter>,
}

impl LocationQuery {
    /// Search around `origin` with the default radius
    pub fn new(origin: Coordinate) -> Self {
        Self {
            origin,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            modes: None,
            bands: None,
        }
    }

    /// Set the search radius; must be finite and positive
    pub fn with_max_distance(mut self, max_distance_km: f64) -> Result<Self, SearchError> {
        if !max_distance_km.is_finite() || max_distance_km <= 0.0 {
            return Err(SearchError::invalid(
                "max_distance_km",
                format!("{} must be a positive number of kilometres", max_distance_km),
            ));
        }
        self.max_distance_km = max_distance_km;
        Ok(self)
    }

    pub fn with_modes(mut self, modes: ModeFilter) -> Self {
        self.modes = Some(modes);
        self
    }

    pub fn with_bands(mut self, bands: BandFilter) -> Self {
        self.bands = Some(bands);
        self
    }

    pub fn origin(&self) -> &Coordinate {
        &self.origin
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km
    }

    pub fn modes(&self) -> Option<&ModeFilter> {
        self.modes.as_ref()
    }

    pub fn bands(&self) -> Option<&BandFilter> {
        self.bands.as_ref()
    }
}

/// Callsign prefix search, optionally ranked by distance from an origin
#[derive(Debug, Clone)]
pub struct CallsignQuery {
    prefix: String,
    origin: Option<Coordinate>,
    modes: Option<ModeFilter>,
    bands: Option<BandFilter>,
}

impl CallsignQuery {
    /// Prefix is trimmed and upper-cased; it must not be empty
    pub fn new(prefix: &str) -> Result<Self, SearchError> {
        let prefix = prefix.trim().to_uppercase();
        if prefix.is_empty() {
            return Err(SearchError::invalid("callsign", "prefix must not be empty"));
        }
        Ok(Self {
            prefix,
            origin: None,
            modes: None,
            bands: None,
        })
    }

    pub fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_modes(mut self, modes: ModeFilter) -> Self {
        self.modes = Some(modes);
        self
    }

    pub fn with_bands(mut self, bands: BandFilter) -> Self {
        self.bands = Some(bands);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn origin(&self) -> Option<&Coordinate> {
        self.origin.as_ref()
    }

    pub fn modes(&self) -> Option<&ModeFilter> {
        self.modes.as_ref()
    }

    pub fn bands(&self) -> Option<&BandFilter> {
        self.bands.as_ref()
    }
}

/// A validated query of either kind
#[derive(Debug, Clone)]
pub enum Query {
    Location(LocationQuery),
    Callsign(CallsignQuery),
}

/// One mode pattern or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModePatterns {
    One(String),
    Many(Vec<String>),
}

impl ModePatterns {
    fn to_filter(&self) -> Result<ModeFilter, SearchError> {
        match self {
            ModePatterns::One(pattern) => ModeFilter::single(pattern),
            ModePatterns::Many(patterns) => ModeFilter::new(patterns),
        }
    }
}

/// Loosely-typed search arguments, e.g. from a tool call.
///
/// A `callsign` selects callsign search; otherwise coordinates select
/// location search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub modes: Option<ModePatterns>,
    /// Flat list of `[low_MHz, high_MHz]` pairs
    #[serde(default)]
    pub bands: Option<Vec<(f64, f64)>>,
}

impl SearchRequest {
    /// Validate into a typed query.
    ///
    /// `default_max_distance_km` applies when a location search gives no radius.
    pub fn to_query(&self, default_max_distance_km: f64) -> Result<Query, SearchError> {
        let origin = Coordinate::from_parts(self.latitude, self.longitude)?;
        let modes = self.modes.as_ref().map(ModePatterns::to_filter).transpose()?;
        let bands = self
            .bands
            .as_deref()
            .map(BandFilter::from_mhz_pairs)
            .transpose()?;

        if let Some(callsign) = &self.callsign {
            if self.max_distance_km.is_some() {
                return Err(SearchError::invalid(
                    "max_distance_km",
                    "a radius only applies to location searches, not callsign searches",
                ));
            }

            let mut query = CallsignQuery::new(callsign)?;
            if let Some(origin) = origin {
                query = query.with_origin(origin);
            }
            if let Some(modes) = modes {
                query = query.with_modes(modes);
            }
            if let Some(bands) = bands {
                query = query.with_bands(bands);
            }
            return Ok(Query::Callsign(query));
        }

        let origin = origin.ok_or_else(|| {
            SearchError::invalid("origin", "latitude and longitude are required without a callsign")
        })?;

        let mut query = LocationQuery::new(origin)
            .with_max_distance(self.max_distance_km.unwrap_or(default_max_distance_km))?;
        if let Some(modes) = modes {
            query = query.with_modes(modes);
        }
        if let Some(bands) = bands {
            query = query.with_bands(bands);
        }
        Ok(Query::Location(query))
    }
}
