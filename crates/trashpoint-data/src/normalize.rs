//! Conversion of loosely-typed dataset rows into [`PointRecord`]s.
//!
//! Rows arrive as JSON objects whose values may be strings, numbers or null
//! depending on the column and the exporter. They are
//! only ever handled as [`RawRow`] here; everything downstream sees typed
//! records.

use chrono::NaiveTime;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{LATITUDE_RANGE, LONGITUDE_RANGE, PointRecord, ServiceTime};

/// A single dataset row as delivered by the source.
pub type RawRow = Map<String, Value>;

/// Why a row was excluded from the index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationReject {
    #[error("missing {field}")]
    Missing { field: &'static str },
    #[error("{field} is not numeric: '{value}'")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("row is {kind}, not an object")]
    NotAnObject { kind: &'static str },
}

/// Column names to read each field from, tried in order.
///
/// The defaults match the Taipei City dataset and fall back to plain English
/// keys so hand-written fixtures and other exports work unchanged.
#[derive(Debug, Clone)]
pub struct RowSchema {
    pub id: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub location_name: Vec<String>,
    pub district: Vec<String>,
    pub village: Vec<String>,
    pub route: Vec<String>,
    pub arrival_time: Vec<String>,
    pub departure_time: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            id: keys(&["_id", "id"]),
            latitude: keys(&["緯度", "latitude"]),
            longitude: keys(&["經度", "longitude"]),
            location_name: keys(&["地點", "location_name"]),
            district: keys(&["行政區", "district"]),
            village: keys(&["里別", "village"]),
            route: keys(&["路線", "route"]),
            arrival_time: keys(&["抵達時間", "arrival_time"]),
            departure_time: keys(&["離開時間", "departure_time"]),
        }
    }
}

impl RowSchema {
    fn lookup<'a>(row: &'a RawRow, candidates: &[String]) -> Option<&'a Value> {
        candidates
            .iter()
            .filter_map(|key| row.get(key))
            .find(|v| !v.is_null())
    }
}

/// Normalize one raw row.
///
/// `position` is the row's absolute offset in the dataset and only serves as
/// the record id when the row carries none.
pub fn normalize_row(
    row: &RawRow,
    schema: &RowSchema,
    position: usize,
) -> Result<PointRecord, ValidationReject> {
    let latitude = parse_coordinate(
        RowSchema::lookup(row, &schema.latitude),
        "latitude",
        &LATITUDE_RANGE,
    )?;
    let longitude = parse_coordinate(
        RowSchema::lookup(row, &schema.longitude),
        "longitude",
        &LONGITUDE_RANGE,
    )?;

    Ok(PointRecord {
        id: text_field(row, &schema.id).unwrap_or_else(|| format!("row-{position}")),
        district: text_field(row, &schema.district),
        village: text_field(row, &schema.village),
        route: text_field(row, &schema.route),
        location_name: text_field(row, &schema.location_name).unwrap_or_default(),
        latitude,
        longitude,
        arrival_time: parse_service_time(RowSchema::lookup(row, &schema.arrival_time)),
        departure_time: parse_service_time(RowSchema::lookup(row, &schema.departure_time)),
    })
}

/// Normalize one row of a fetched page, which may not be an object at all.
pub fn normalize_value(
    value: &Value,
    schema: &RowSchema,
    position: usize,
) -> Result<PointRecord, ValidationReject> {
    let kind = match value {
        Value::Object(row) => return normalize_row(row, schema, position),
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };
    Err(ValidationReject::NotAnObject { kind })
}

fn text_field(row: &RawRow, candidates: &[String]) -> Option<String> {
    RowSchema::lookup(row, candidates).and_then(value_to_text)
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn parse_coordinate(
    value: Option<&Value>,
    field: &'static str,
    range: &std::ops::RangeInclusive<f64>,
) -> Result<f64, ValidationReject> {
    let parsed = match value {
        None => return Err(ValidationReject::Missing { field }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ValidationReject::Missing { field });
            }
            trimmed.parse::<f64>().ok()
        }
        Some(_) => None,
    };

    let Some(v) = parsed.filter(|v| v.is_finite()) else {
        return Err(ValidationReject::NotNumeric {
            field,
            value: value.map(ToString::to_string).unwrap_or_default(),
        });
    };

    if range.contains(&v) {
        Ok(v)
    } else {
        Err(ValidationReject::OutOfRange { field, value: v })
    }
}

/// Parse a time column.
///
/// The source stores times as bare `HHMM` tokens with the leading zero
/// dropped (`905` for 09:05), either as a string or as a number. `HH:MM` is
/// accepted as well. Anything else maps to [`ServiceTime::Unavailable`].
pub fn parse_service_time(value: Option<&Value>) -> ServiceTime {
    let token = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(n) => n.to_string(),
            None => return ServiceTime::Unavailable,
        },
        _ => return ServiceTime::Unavailable,
    };

    let (hours, minutes) = if let Some((h, m)) = token.split_once(':') {
        (h.to_string(), m.to_string())
    } else if (1..=4).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit()) {
        let padded = format!("{token:0>4}");
        (padded[..2].to_string(), padded[2..].to_string())
    } else {
        return ServiceTime::Unavailable;
    };

    match (hours.parse::<u32>(), minutes.parse::<u32>()) {
        (Ok(h), Ok(m)) if minutes.len() == 2 => NaiveTime::from_hms_opt(h, m, 0)
            .map_or(ServiceTime::Unavailable, ServiceTime::At),
        _ => ServiceTime::Unavailable,
    }
}
