//! Trashpoint - Nearest Garbage-Truck Stop Lookup
//!
//! Trashpoint answers "where is the closest scheduled collection stop to this
//! coordinate, and when does the truck arrive?" It ingests a paginated
//! municipal dataset (by default the Taipei City garbage-truck stops published
//! on `data.taipei`), validates every row, and serves nearest-neighbor queries
//! from an in-memory snapshot that can be refreshed in the background.
//!
//! # Quick Start
//!
//! ```no_run
//! use trashpoint::{LoaderConfig, PointLocator, QueryConfigBuilder, QueryStatus};
//!
//! # async fn run() -> Result<(), trashpoint::error::TrashPointError> {
//! trashpoint::init_logging(tracing::Level::INFO)?;
//!
//! let locator = PointLocator::initialize(
//!     LoaderConfig::default(),
//!     QueryConfigBuilder::neighbourhood().build(),
//! )
//! .await?;
//!
//! let result = locator.handle(25.0330, 121.5654);
//! match result.status {
//!     QueryStatus::Found => {
//!         for stop in &result.matches {
//!             println!(
//!                 "{} ({} m) {}",
//!                 stop.record.location_name,
//!                 stop.distance_meters(),
//!                 stop.record.schedule()
//!             );
//!         }
//!     }
//!     QueryStatus::OutOfRange => println!("No stop within walking distance"),
//!     QueryStatus::NotFound(reason) => println!("No result: {reason:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Data
//!
//! Rows are fetched page by page and normalized by [`trashpoint_data`]. Rows
//! with missing or out-of-range coordinates are dropped and counted in the
//! [`LoadReport`]; malformed service times become [`ServiceTime::Unavailable`].
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
mod distance;
pub mod error;
mod index;
mod search;

pub use core::{LocatorInfo, PointLocator};

pub use config::QueryConfigBuilder;
pub use distance::{EARTH_RADIUS_KM, distance_km};
pub use index::{GeoIndex, Neighbor, SnapshotStore};
pub use search::{
    DEFAULT_LIMIT, NotFoundReason, QueryConfig, QueryResult, QueryStatus, handle_query,
};
pub use trashpoint_data as data;
#[cfg(feature = "download_data")]
pub use trashpoint_data::HttpPageSource;
pub use trashpoint_data::{
    DatasetLoader, FetchError, LoadReport, LoaderConfig, PageSource, PointRecord, ServiceTime,
};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Trashpoint library.
///
/// Installs a `fmt` subscriber honouring `RUST_LOG`, falling back to `level`.
/// HTTP client internals are capped at `warn`. Later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use trashpoint::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), trashpoint::error::TrashPointError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::TrashPointError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}
