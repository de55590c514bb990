//! Paginated dataset loading.
//!
//! A load walks the source page by page from offset 0 and stops at the first
//! empty page, once the source-reported total has been seen, or when the page
//! cap is hit. One failed page fails the whole load; callers never see a
//! partial record set.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::normalize::{RowSchema, normalize_value};
use crate::raw::{Page, PageSource};
use crate::record::PointRecord;
use crate::{ConfigError, DEFAULT_DATASET_URL, FetchError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 500;
pub const DEFAULT_MAX_PAGES: usize = 10;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [`DatasetLoader`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub dataset_url: String,
    /// Rows requested per page.
    pub page_size: usize,
    /// Hard cap on pages fetched in one load.
    pub max_pages: usize,
    /// Upper bound on a single page fetch.
    pub fetch_timeout: Duration,
    pub schema: RowSchema,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            schema: RowSchema::default(),
        }
    }
}

impl LoaderConfig {
    /// Build a config from `TRASHPOINT_*` environment variables, using the
    /// defaults for anything unset.
    ///
    /// - `TRASHPOINT_DATASET_URL`
    /// - `TRASHPOINT_PAGE_SIZE`
    /// - `TRASHPOINT_MAX_PAGES`
    /// - `TRASHPOINT_FETCH_TIMEOUT_SECS`
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, ConfigError> {
        fn number(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &'static str,
        ) -> std::result::Result<Option<u64>, ConfigError> {
            lookup(name)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidEnvValue { name, value })
                })
                .transpose()
        }

        let mut config = Self::default();
        if let Some(url) = lookup("TRASHPOINT_DATASET_URL") {
            config.dataset_url = url;
        }
        if let Some(n) = number(&lookup, "TRASHPOINT_PAGE_SIZE")? {
            config.page_size = n as usize;
        }
        if let Some(n) = number(&lookup, "TRASHPOINT_MAX_PAGES")? {
            config.max_pages = n as usize;
        }
        if let Some(n) = number(&lookup, "TRASHPOINT_FETCH_TIMEOUT_SECS")? {
            config.fetch_timeout = Duration::from_secs(n);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_schema(mut self, schema: RowSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Zero("max_pages"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Zero("fetch_timeout"));
        }
        Ok(())
    }
}

/// Why pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    #[default]
    EmptyPage,
    TotalReached,
    PageCap,
}

/// Aggregate counters for one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub pages_fetched: usize,
    pub rows_seen: usize,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
    pub reported_total: Option<usize>,
    pub stopped_by: StopReason,
}

/// Result of a successful load, records in source order.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub records: Vec<PointRecord>,
    pub report: LoadReport,
}

pub struct DatasetLoader<S> {
    source: S,
    config: LoaderConfig,
}

impl<S: PageSource> DatasetLoader<S> {
    pub fn new(source: S, config: LoaderConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every page and normalize its rows.
    #[instrument(name = "Load dataset", skip_all, level = "info")]
    pub async fn load(&self) -> Result<LoadedDataset> {
        let t_load = std::time::Instant::now();
        let mut records = Vec::new();
        let mut report = LoadReport {
            stopped_by: StopReason::PageCap,
            ..LoadReport::default()
        };
        let mut offset = 0;

        while report.pages_fetched < self.config.max_pages {
            let page = self.fetch(offset).await?;
            report.pages_fetched += 1;
            if page.total.is_some() {
                report.reported_total = page.total;
            }

            if page.rows.is_empty() {
                debug!(offset, "Empty page, dataset exhausted");
                report.stopped_by = StopReason::EmptyPage;
                break;
            }

            for (i, row) in page.rows.iter().enumerate() {
                let position = offset + i;
                report.rows_seen += 1;
                match normalize_value(row, &self.config.schema, position) {
                    Ok(record) => records.push(record),
                    Err(reject) => {
                        report.rows_rejected += 1;
                        debug!(position, %reject, "Dropping row");
                    }
                }
            }

            if report
                .reported_total
                .is_some_and(|total| report.rows_seen >= total)
            {
                report.stopped_by = StopReason::TotalReached;
                break;
            }
            offset += self.config.page_size;
        }

        if report.stopped_by == StopReason::PageCap {
            warn!(
                max_pages = self.config.max_pages,
                reported_total = ?report.reported_total,
                "Page cap reached before the dataset was exhausted"
            );
        }

        report.rows_accepted = records.len();
        info!(
            pages = report.pages_fetched,
            rows = report.rows_seen,
            valid = report.rows_accepted,
            rejected = report.rows_rejected,
            elapsed = ?t_load.elapsed(),
            "Dataset loaded"
        );
        Ok(LoadedDataset { records, report })
    }

    async fn fetch(&self, offset: usize) -> Result<Page> {
        let timeout = self.config.fetch_timeout;
        tokio::time::timeout(timeout, self.source.fetch_page(offset, self.config.page_size))
            .await
            .map_err(|_| FetchError::Timeout { offset, timeout })?
    }
}
