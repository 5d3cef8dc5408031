//! Repeater search
//!
//! Two-phase location search: a latitude/longitude box prunes the dataset,
//! then exact haversine distance, mode and band predicates refine it.
//! Callsign search uses the dataset's prefix index with the same predicates.

// ============ Geometry ============
pub mod geo;
pub use geo::{BoundingBox, Coordinate, EARTH_RADIUS_KM, haversine_km};

// ============ Filters ============
pub mod filter;
pub use filter::{
    BAND_1_25M, BAND_2M, BAND_70CM, BAND_GMRS, BandFilter, BandRange, MODE_D_STAR, MODE_DMR,
    MODE_FM, MODE_YSF, ModeFilter, band_preset,
};

// ============ Queries ============
mod request;
pub use request::{
    CallsignQuery, DEFAULT_MAX_DISTANCE_KM, LocationQuery, ModePatterns, Query, SearchRequest,
};

// ============ Engine ============
mod engine;
pub use engine::{SearchEngine, SearchOutcome};
