use tracing::{debug, instrument};
use trashpoint_data::{PointRecord, is_valid_coordinate};

use crate::index::{GeoIndex, Neighbor};

/// Number of stops returned when no limit is configured.
pub const DEFAULT_LIMIT: usize = 3;

/// Why a query produced no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NotFoundReason {
    /// No snapshot with any records has been published yet.
    DataNotLoaded,
    /// The query latitude or longitude is not finite or outside its range.
    InvalidCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum QueryStatus {
    Found,
    NotFound(NotFoundReason),
    /// The closest stop lies beyond the configured maximum distance.
    OutOfRange,
}

/// Query policy.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Maximum number of matches returned; always at least 1.
    pub limit: usize,
    /// Inclusive distance threshold in kilometres. `None` disables it.
    pub max_distance_km: Option<f64>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_distance_km: None,
        }
    }
}

/// Outcome of one nearest-stop lookup.
///
/// `matches` is ordered by ascending distance. It is empty for
/// [`QueryStatus::NotFound`] and holds only the best match for
/// [`QueryStatus::OutOfRange`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QueryResult {
    pub matches: Vec<Neighbor>,
    pub status: QueryStatus,
}

impl QueryResult {
    fn not_found(reason: NotFoundReason) -> Self {
        Self {
            matches: Vec::new(),
            status: QueryStatus::NotFound(reason),
        }
    }

    /// Best match, if any.
    pub fn record(&self) -> Option<&PointRecord> {
        self.matches.first().map(|n| &n.record)
    }

    /// Distance to the best match, if any.
    pub fn distance_km(&self) -> Option<f64> {
        self.matches.first().map(|n| n.distance_km)
    }

    pub fn is_found(&self) -> bool {
        self.status == QueryStatus::Found
    }
}

/// Answer a coordinate query against one snapshot.
///
/// Never fails: invalid input and an unloaded index are reported through
/// [`QueryStatus::NotFound`].
#[instrument(level = "debug", skip(index, config), fields(generation = index.generation()))]
pub fn handle_query(
    index: &GeoIndex,
    latitude: f64,
    longitude: f64,
    config: &QueryConfig,
) -> QueryResult {
    if !is_valid_coordinate(latitude, longitude) {
        debug!("Rejected invalid query coordinate");
        return QueryResult::not_found(NotFoundReason::InvalidCoordinate);
    }
    if index.is_empty() {
        return QueryResult::not_found(NotFoundReason::DataNotLoaded);
    }

    let mut matches = index.query_nearest(latitude, longitude, config.limit.max(1));

    let Some(threshold) = config.max_distance_km else {
        return QueryResult {
            matches,
            status: QueryStatus::Found,
        };
    };

    if matches.first().is_some_and(|best| best.distance_km > threshold) {
        matches.truncate(1);
        debug!(threshold, "Closest stop is out of range");
        return QueryResult {
            matches,
            status: QueryStatus::OutOfRange,
        };
    }

    matches.retain(|n| n.distance_km <= threshold);
    QueryResult {
        matches,
        status: QueryStatus::Found,
    }
}
