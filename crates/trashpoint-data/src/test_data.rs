use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::info;

use crate::normalize::RawRow;
use crate::raw::{Page, PageSource};
use crate::{FetchError, Result};

/// Configuration for test data generation
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    /// Number of rows to generate
    pub rows: usize,
    /// Every n-th row (1-based) gets broken coordinates
    pub invalid_every: Option<usize>,
    /// Coordinate of row 1
    pub origin: (f64, f64),
    /// Degrees added to latitude and longitude per row
    pub spacing_deg: f64,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            invalid_every: Some(25),
            origin: (25.0, 121.5),
            spacing_deg: 0.0005,
        }
    }
}

impl TestDataConfig {
    /// Minimal data for unit tests
    pub fn minimal() -> Self {
        Self {
            rows: 3,
            invalid_every: None,
            ..Self::default()
        }
    }

    /// 750 rows, matching a dataset that needs a second 500-row page
    pub fn sample() -> Self {
        Self {
            rows: 750,
            invalid_every: Some(50),
            ..Self::default()
        }
    }

    pub fn expected_invalid_rows(&self) -> usize {
        self.invalid_every.filter(|&n| n > 0).map_or(0, |n| self.rows / n)
    }
}

/// A row shaped like the Taipei dataset export.
pub fn stop_row(id: u64, name: &str, latitude: f64, longitude: f64) -> RawRow {
    into_row(json!({
        "_id": id,
        "行政區": "大安區",
        "里別": "測試里",
        "路線": "測試路線",
        "地點": name,
        "緯度": format!("{latitude}"),
        "經度": format!("{longitude}"),
        "抵達時間": "1930",
        "離開時間": "1938",
    }))
}

fn into_row(value: Value) -> RawRow {
    match value {
        Value::Object(map) => map,
        _ => RawRow::new(),
    }
}

/// Generate rows along a diagonal starting at `config.origin`.
pub fn create_test_rows(config: &TestDataConfig) -> Vec<RawRow> {
    info!("Creating test rows with config: {:?}", config);

    (1..=config.rows)
        .map(|i| {
            let offset = i as f64 * config.spacing_deg;
            let mut row = stop_row(
                i as u64,
                &format!("Stop {i}"),
                config.origin.0 + offset,
                config.origin.1 + offset,
            );
            row.insert(
                "抵達時間".into(),
                json!(format!("{}{:02}", 17 + (i / 60) % 4, i % 60)),
            );
            if let Some(n) = config.invalid_every.filter(|&n| n > 0 && i % n == 0) {
                // alternate between a garbage latitude and a missing longitude
                if (i / n) % 2 == 0 {
                    row.insert("緯度".into(), json!("abc"));
                } else {
                    row.remove("經度");
                }
            }
            row
        })
        .collect()
}

/// In-memory [`PageSource`] that records every requested offset.
#[derive(Debug, Default)]
pub struct StaticPageSource {
    rows: Vec<Value>,
    total: Option<usize>,
    repeat: bool,
    fail_at: Option<usize>,
    delay: Option<Duration>,
    requests: Mutex<Vec<usize>>,
}

impl StaticPageSource {
    /// Serve `rows`, reporting their length as the total count.
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self::from_values(rows.into_iter().map(Value::Object).collect())
    }

    /// Serve arbitrary JSON values as rows, including ones that are not objects.
    pub fn from_values(rows: Vec<Value>) -> Self {
        let total = Some(rows.len());
        Self {
            rows,
            total,
            ..Self::default()
        }
    }

    pub fn without_total(mut self) -> Self {
        self.total = None;
        self
    }

    pub fn reporting_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Wrap around instead of running out of rows.
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn failing_at(mut self, offset: usize) -> Self {
        self.fail_at = Some(offset);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested_offsets(&self) -> Vec<usize> {
        self.requests.lock().clone()
    }
}

impl PageSource for StaticPageSource {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page> {
        self.requests.lock().push(offset);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == Some(offset) {
            return Err(FetchError::Source(format!(
                "simulated failure at offset {offset}"
            )));
        }

        let rows = if self.repeat && !self.rows.is_empty() {
            (offset..offset + limit)
                .map(|i| self.rows[i % self.rows.len()].clone())
                .collect()
        } else {
            self.rows.iter().skip(offset).take(limit).cloned().collect()
        };
        Ok(Page {
            rows,
            total: self.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{RowSchema, normalize_row};

    #[test]
    fn test_minimal_rows_are_valid() {
        let rows = create_test_rows(&TestDataConfig::minimal());
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert!(normalize_row(row, &RowSchema::default(), i).is_ok());
        }
    }

    #[test]
    fn test_sample_invalid_row_count() {
        let config = TestDataConfig::sample();
        let rows = create_test_rows(&config);
        let invalid = rows
            .iter()
            .enumerate()
            .filter(|(i, row)| normalize_row(row, &RowSchema::default(), *i).is_err())
            .count();
        assert_eq!(invalid, config.expected_invalid_rows());
        assert_eq!(invalid, 15);
    }

    #[tokio::test]
    async fn test_static_source_pages() {
        let source = StaticPageSource::new(create_test_rows(&TestDataConfig::minimal()));
        let first = source.fetch_page(0, 2).await.unwrap();
        let second = source.fetch_page(2, 2).await.unwrap();
        let third = source.fetch_page(4, 2).await.unwrap();

        assert_eq!(first.rows.len(), 2);
        assert_eq!(second.rows.len(), 1);
        assert!(third.rows.is_empty());
        assert_eq!(first.total, Some(3));
        assert_eq!(source.requested_offsets(), vec![0, 2, 4]);
    }
}
