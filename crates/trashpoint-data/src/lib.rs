//! Dataset ingestion for the trashpoint collection-stop locator.
//!
//! This crate owns everything between the remote tabular dataset and a typed,
//! validated list of [`PointRecord`]s:
//!
//! - [`raw`] describes one fetched page and the [`PageSource`] seam used to fetch it
//!   (an HTTP implementation lives behind the `download_data` feature).
//! - [`normalize`] turns loosely-typed rows into records, rejecting malformed ones.
//! - [`loader`] paginates a source until exhaustion or the page cap.

pub mod loader;
pub mod normalize;
pub mod raw;
pub mod record;
#[cfg(any(test, feature = "test_data"))]
pub mod test_data;

mod error {
    use std::time::Duration;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum FetchError {
        #[cfg(feature = "download_data")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("Dataset responded with HTTP {status} for offset {offset}")]
        Status { status: u16, offset: usize },
        #[error("Failed to decode dataset page: {0}")]
        Decode(#[from] serde_json::Error),
        #[error("Page fetch at offset {offset} timed out after {timeout:?}")]
        Timeout { offset: usize, timeout: Duration },
        #[error("Invalid dataset URL '{url}': {reason}")]
        InvalidUrl { url: String, reason: String },
        #[error("Page source error: {0}")]
        Source(String),
    }

    #[derive(Error, Debug)]
    pub enum ConfigError {
        #[error("Environment variable {name} has invalid value '{value}'")]
        InvalidEnvValue { name: &'static str, value: String },
        #[error("{0} must be greater than zero")]
        Zero(&'static str),
    }

    pub type Result<T> = std::result::Result<T, FetchError>;
}

pub use error::{ConfigError, FetchError, Result};

pub use loader::{DatasetLoader, LoadReport, LoadedDataset, LoaderConfig, StopReason};
pub use normalize::{RawRow, RowSchema, ValidationReject, normalize_row, normalize_value};
#[cfg(feature = "download_data")]
pub use raw::fetch::HttpPageSource;
pub use raw::{Page, PageSource};
pub use record::{PointRecord, ServiceTime, is_valid_coordinate};

/// Taipei City garbage-truck stop dataset on `data.taipei`.
pub const DEFAULT_DATASET_URL: &str = "https://data.taipei/api/v1/dataset/a6e90031-7ec4-4089-afb5-361a4efe7202?scope=resourceAquire";
