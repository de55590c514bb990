use std::fmt;
use std::ops::RangeInclusive;

use chrono::NaiveTime;
use serde::{Serialize, Serializer};

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Returns `true` if both values are finite and inside the WGS84 ranges.
#[must_use]
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    LATITUDE_RANGE.contains(&latitude) && LONGITUDE_RANGE.contains(&longitude)
}

/// Scheduled arrival or departure time of the truck at a stop.
///
/// The dataset frequently leaves these columns blank, so absence is a value of
/// its own rather than an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceTime {
    At(NaiveTime),
    #[default]
    Unavailable,
}

impl ServiceTime {
    /// Marker rendered in place of a missing time.
    pub const UNAVAILABLE_MARKER: &'static str = "--:--";

    pub fn clock(&self) -> Option<NaiveTime> {
        match self {
            Self::At(t) => Some(*t),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::At(_))
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(t) => write!(f, "{}", t.format("%H:%M")),
            Self::Unavailable => f.write_str(Self::UNAVAILABLE_MARKER),
        }
    }
}

impl Serialize for ServiceTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::At(_) => serializer.collect_str(self),
            Self::Unavailable => serializer.serialize_none(),
        }
    }
}

/// One garbage-truck stop with validated coordinates.
///
/// Records are only produced by [`crate::normalize_row`], which guarantees
/// `latitude`/`longitude` are finite and in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRecord {
    /// Source row identifier. Not guaranteed to be unique across loads.
    pub id: String,
    pub district: Option<String>,
    pub village: Option<String>,
    pub route: Option<String>,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub arrival_time: ServiceTime,
    pub departure_time: ServiceTime,
}

impl PointRecord {
    /// Google Maps search link pointing at this stop.
    pub fn map_url(&self) -> String {
        let query = format!("{},{} {}", self.latitude, self.longitude, self.location_name);
        url::Url::parse_with_params(
            "https://www.google.com/maps/search/",
            &[("api", "1"), ("query", query.trim_end())],
        )
        .map_or_else(|_| String::new(), String::from)
    }

    /// `arrival - departure` window, e.g. `"19:30 - 19:38"`.
    pub fn schedule(&self) -> String {
        format!("{} - {}", self.arrival_time, self.departure_time)
    }
}
