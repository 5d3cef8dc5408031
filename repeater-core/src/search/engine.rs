//! Repeater search engine
//!
//! Holds the currently published dataset and answers location and callsign
//! queries against it. Queries never mutate shared state; each one clones
//! the dataset handle once and works on that snapshot.

use std::sync::{Arc, RwLock};

use super::filter::{BandFilter, ModeFilter};
use super::geo::{BoundingBox, Coordinate};
use super::request::{CallsignQuery, DEFAULT_MAX_DISTANCE_KM, LocationQuery, Query, SearchRequest};
use crate::config::DirectoryConfig;
use crate::dataset::RepeaterDataset;
use crate::error::{DatasetError, SearchError};
use crate::record::SearchResult;

/// Result of a search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// No dataset has been loaded; distinct from finding nothing
    Unavailable,
    /// Matches in result order (possibly empty)
    Matches(Vec<SearchResult>),
}

impl SearchOutcome {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SearchOutcome::Unavailable)
    }

    /// Matches, or `None` when no dataset was available
    pub fn matches(&self) -> Option<&[SearchResult]> {
        match self {
            SearchOutcome::Unavailable => None,
            SearchOutcome::Matches(results) => Some(results),
        }
    }

    pub fn into_matches(self) -> Option<Vec<SearchResult>> {
        match self {
            SearchOutcome::Unavailable => None,
            SearchOutcome::Matches(results) => Some(results),
        }
    }
}

/// Search engine over a swappable, immutable dataset
pub struct SearchEngine {
    dataset: RwLock<Option<Arc<RepeaterDataset>>>,
    default_max_distance_km: f64,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Engine with no dataset; every search answers `Unavailable`
    pub fn new() -> Self {
        Self {
            dataset: RwLock::new(None),
            default_max_distance_km: DEFAULT_MAX_DISTANCE_KM,
        }
    }

    /// Engine serving `dataset`
    pub fn with_dataset(dataset: RepeaterDataset) -> Self {
        let engine = Self::new();
        engine.publish(dataset);
        engine
    }

    /// Engine from directory config.
    ///
    /// A missing snapshot file leaves the engine without data; an unreadable
    /// or malformed one is an error.
    pub async fn from_config(config: &DirectoryConfig) -> Result<Self, DatasetError> {
        let mut engine = Self::new();
        engine.default_max_distance_km = config.default_max_distance_km;

        let path = &config.snapshot_path;
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| DatasetError::io(path, e))?;
        if exists {
            let dataset = RepeaterDataset::load_snapshot(path).await?;
            engine.publish(dataset);
        } else {
            tracing::warn!(
                "Repeater snapshot not found at {}, repeater search unavailable",
                path.display()
            );
        }

        Ok(engine)
    }

    /// Radius used when a request gives none
    pub fn default_max_distance_km(&self) -> f64 {
        self.default_max_distance_km
    }

    /// Swap in a fully built dataset
    pub fn publish(&self, dataset: RepeaterDataset) {
        self.publish_shared(Arc::new(dataset));
    }

    /// Swap in a dataset that is already shared elsewhere
    pub fn publish_shared(&self, dataset: Arc<RepeaterDataset>) {
        let len = dataset.len();
        let mut guard = self.dataset.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(dataset);
        tracing::info!("Published repeater dataset with {} records", len);
    }

    /// Drop the current dataset
    pub fn clear(&self) {
        let mut guard = self.dataset.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Current dataset snapshot, if any
    pub fn dataset(&self) -> Option<Arc<RepeaterDataset>> {
        self.dataset
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Validate loose request arguments and run the matching search
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let query = request.to_query(self.default_max_distance_km)?;
        Ok(match query {
            Query::Location(query) => self.search_by_location(&query),
            Query::Callsign(query) => self.search_by_callsign(&query),
        })
    }

    /// Repeaters within the query radius, nearest first
    pub fn search_by_location(&self, query: &LocationQuery) -> SearchOutcome {
        let Some(dataset) = self.dataset() else {
            return SearchOutcome::Unavailable;
        };

        let origin = query.origin();
        let max_distance_km = query.max_distance_km();
        let bbox = BoundingBox::around(origin, max_distance_km);
        let candidates = dataset.positions_in_box(&bbox);
        let candidate_count = candidates.len();

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .filter_map(|position| dataset.get(position))
            .filter_map(|record| {
                // The box is loose; exact distance decides
                let distance = origin.distance_km(&record.location);
                (distance <= max_distance_km).then_some((record, distance))
            })
            .filter(|(record, _)| {
                passes_filters(&record.mode, record.frequency_hz, query.modes(), query.bands())
            })
            .map(|(record, distance)| SearchResult::new(record.clone(), Some(distance)))
            .collect();

        sort_by_distance(&mut results);

        tracing::debug!(
            "Location search ({:.4}, {:.4}) r={} km: {} in box, {} matched",
            origin.latitude,
            origin.longitude,
            max_distance_km,
            candidate_count,
            results.len()
        );

        SearchOutcome::Matches(results)
    }

    /// Repeaters whose callsign starts with the query prefix.
    ///
    /// With an origin, results carry distances and are sorted nearest first
    /// (no radius cutoff); without one they stay in dataset order.
    pub fn search_by_callsign(&self, query: &CallsignQuery) -> SearchOutcome {
        let Some(dataset) = self.dataset() else {
            return SearchOutcome::Unavailable;
        };

        let candidates = dataset.positions_with_callsign_prefix(query.prefix());
        let candidate_count = candidates.len();
        let origin: Option<&Coordinate> = query.origin();

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .filter_map(|position| dataset.get(position))
            .filter(|record| {
                passes_filters(&record.mode, record.frequency_hz, query.modes(), query.bands())
            })
            .map(|record| {
                let distance = origin.map(|o| o.distance_km(&record.location));
                SearchResult::new(record.clone(), distance)
            })
            .collect();

        if origin.is_some() {
            sort_by_distance(&mut results);
        }

        tracing::debug!(
            "Callsign search {:?}: {} prefix matches, {} after filters",
            query.prefix(),
            candidate_count,
            results.len()
        );

        SearchOutcome::Matches(results)
    }
}

/// Mode and band predicates; absent filters pass everything
fn passes_filters(
    mode: &str,
    frequency_hz: u64,
    modes: Option<&ModeFilter>,
    bands: Option<&BandFilter>,
) -> bool {
    modes.is_none_or(|m| m.matches(mode)) && bands.is_none_or(|b| b.matches(frequency_hz))
}

/// Stable ascending sort; equal distances keep dataset order
fn sort_by_distance(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        let a = a.distance_km.unwrap_or(f64::INFINITY);
        let b = b.distance_km.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
}
