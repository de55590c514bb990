//! The [`PointLocator`] facade.
//!
//! A locator owns the dataset loader, the published snapshot and the default
//! query policy. Queries are synchronous and always answered from the latest
//! complete snapshot; loads run asynchronously and replace the snapshot only
//! when they succeed.
//!
//! ```no_run
//! use trashpoint::{LoaderConfig, PointLocator, QueryConfigBuilder};
//!
//! # async fn run() -> Result<(), trashpoint::error::TrashPointError> {
//! let locator = PointLocator::initialize(
//!     LoaderConfig::from_env()?,
//!     QueryConfigBuilder::neighbourhood().build(),
//! )
//! .await?;
//!
//! let result = locator.handle(25.0330, 121.5654);
//! if let Some(stop) = result.record() {
//!     println!("{} arrives at {}", stop.location_name, stop.arrival_time);
//! }
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info, instrument, warn};
#[cfg(feature = "download_data")]
use trashpoint_data::HttpPageSource;
use trashpoint_data::{DatasetLoader, LoadReport, LoaderConfig, PageSource};

use crate::{
    error::Result,
    index::{GeoIndex, SnapshotStore},
    search::{QueryConfig, QueryResult, handle_query},
};

/// Nearest collection-stop lookup over a periodically reloaded dataset.
pub struct PointLocator<S> {
    loader: DatasetLoader<S>,
    store: SnapshotStore,
    query_config: QueryConfig,
}

#[cfg(feature = "download_data")]
impl PointLocator<HttpPageSource> {
    /// Create a locator backed by the HTTP dataset API and run the first load.
    ///
    /// A failed first load is logged and leaves the locator serving the empty
    /// snapshot, so queries report `DataNotLoaded` until a refresh succeeds.
    /// Only an invalid configuration is returned as an error.
    #[instrument(name = "Initialize PointLocator", skip_all, level = "info")]
    pub async fn initialize(loader_config: LoaderConfig, query_config: QueryConfig) -> Result<Self> {
        loader_config.validate()?;
        info!(url = %loader_config.dataset_url, "Initializing PointLocator");
        let source = HttpPageSource::new(&loader_config)?;
        Self::start(source, loader_config, query_config).await
    }
}

impl<S: PageSource> PointLocator<S> {
    /// Create a locator without loading anything.
    pub fn new(source: S, loader_config: LoaderConfig, query_config: QueryConfig) -> Self {
        Self {
            loader: DatasetLoader::new(source, loader_config),
            store: SnapshotStore::new(),
            query_config,
        }
    }

    /// Create a locator over any page source and run the first load.
    pub async fn start(source: S, loader_config: LoaderConfig, query_config: QueryConfig) -> Result<Self> {
        loader_config.validate()?;
        let locator = Self::new(source, loader_config, query_config);
        if locator.refresh().await.is_err() {
            warn!("Starting without data; queries will report DataNotLoaded until a refresh succeeds");
        }
        Ok(locator)
    }

    /// Load the dataset again and publish it.
    ///
    /// On failure the previous snapshot stays in service.
    #[instrument(name = "Refresh dataset", skip_all, level = "info")]
    pub async fn refresh(&self) -> Result<LoadReport> {
        match self.loader.load().await {
            Ok(dataset) => {
                let report = dataset.report.clone();
                let snapshot = self.store.publish(GeoIndex::new(dataset.records, dataset.report));
                info!(
                    generation = snapshot.generation(),
                    records = snapshot.len(),
                    "Snapshot refreshed"
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    error = %e,
                    generation = self.store.current().generation(),
                    "Dataset refresh failed, keeping previous snapshot"
                );
                Err(e.into())
            }
        }
    }

    /// Answer a query with the locator's default policy.
    pub fn handle(&self, latitude: f64, longitude: f64) -> QueryResult {
        self.handle_with_config(latitude, longitude, &self.query_config)
    }

    pub fn handle_with_config(&self, latitude: f64, longitude: f64, config: &QueryConfig) -> QueryResult {
        handle_query(&self.store.current(), latitude, longitude, config)
    }

    /// The snapshot currently in service.
    pub fn snapshot(&self) -> Arc<GeoIndex> {
        self.store.current()
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }

    pub fn loader_config(&self) -> &LoaderConfig {
        self.loader.config()
    }

    pub fn info(&self) -> LocatorInfo {
        let snapshot = self.store.current();
        LocatorInfo {
            generation: snapshot.generation(),
            records: snapshot.len(),
            loaded_at: snapshot.loaded_at(),
            report: snapshot.report().cloned(),
        }
    }
}

impl<S: PageSource + 'static> PointLocator<S> {
    /// Refresh every `period` on a background task.
    ///
    /// The first refresh happens one full period after the call. Failures are
    /// logged by [`refresh`](Self::refresh) and the loop carries on.
    pub fn spawn_refresh(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        info!(?period, "Starting periodic refresh");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let _ = self.refresh().await;
            }
        })
    }
}

/// State of a locator's current snapshot.
#[derive(Debug, Clone)]
pub struct LocatorInfo {
    pub generation: u64,
    pub records: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub report: Option<LoadReport>,
}

impl LocatorInfo {
    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    /// Get a human-readable summary of the locator.
    pub fn summary(&self) -> String {
        match (self.loaded_at, &self.report) {
            (Some(at), Some(report)) => format!(
                "PointLocator snapshot #{} with {} stops loaded at {} ({} rows rejected over {} pages)",
                self.generation,
                self.records,
                at.to_rfc3339(),
                report.rows_rejected,
                report.pages_fetched
            ),
            (Some(at), None) => format!(
                "PointLocator snapshot #{} with {} stops loaded at {}",
                self.generation,
                self.records,
                at.to_rfc3339()
            ),
            _ => "PointLocator with no data loaded".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::search::{NotFoundReason, QueryStatus};
    use trashpoint_data::{
        FetchError, Page,
        test_data::{StaticPageSource, TestDataConfig, create_test_rows, stop_row},
    };

    /// Serves its inner source until switched into failure mode.
    struct FlakySource {
        inner: StaticPageSource,
        failing: AtomicBool,
    }

    impl FlakySource {
        fn new(inner: StaticPageSource) -> Self {
            Self {
                inner,
                failing: AtomicBool::new(false),
            }
        }
    }

    impl PageSource for FlakySource {
        async fn fetch_page(&self, offset: usize, limit: usize) -> trashpoint_data::Result<Page> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(FetchError::Source("connection reset".to_string()));
            }
            self.inner.fetch_page(offset, limit).await
        }
    }

    fn sample_source() -> StaticPageSource {
        StaticPageSource::new(create_test_rows(&TestDataConfig::sample()))
    }

    #[tokio::test]
    async fn test_handle_before_load_reports_data_not_loaded() {
        let locator = PointLocator::new(sample_source(), LoaderConfig::default(), QueryConfig::default());
        let result = locator.handle(25.0, 121.5);
        assert_eq!(result.status, QueryStatus::NotFound(NotFoundReason::DataNotLoaded));
        assert!(!locator.info().is_loaded());
        assert_eq!(locator.info().summary(), "PointLocator with no data loaded");
    }

    #[tokio::test]
    async fn test_start_loads_and_answers() {
        let config = TestDataConfig::sample();
        let locator = PointLocator::start(sample_source(), LoaderConfig::default(), QueryConfig::default())
            .await
            .unwrap();

        let snapshot = locator.snapshot();
        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.len(), config.rows - config.expected_invalid_rows());

        // row 1 sits one spacing step from the origin
        let first = &snapshot.records()[0];
        let result = locator.handle(first.latitude, first.longitude);
        assert!(result.is_found());
        assert_eq!(result.record(), Some(first));
        assert_eq!(result.matches.len(), 3);
        assert_eq!(result.matches[0].distance_meters(), 0);
    }

    #[test]
    fn test_exposes_configuration() {
        let query_config = QueryConfig {
            limit: 5,
            max_distance_km: Some(0.8),
        };
        let locator = PointLocator::new(
            sample_source(),
            LoaderConfig::default().with_page_size(250),
            query_config.clone(),
        );
        assert_eq!(locator.query_config(), &query_config);
        assert_eq!(locator.loader_config().page_size, 250);
        assert_eq!(locator.loader_config().max_pages, trashpoint_data::loader::DEFAULT_MAX_PAGES);
    }

    #[tokio::test]
    async fn test_start_survives_failed_first_load() {
        let source = StaticPageSource::new(Vec::new()).failing_at(0);
        let locator = PointLocator::start(source, LoaderConfig::default(), QueryConfig::default())
            .await
            .unwrap();
        assert_eq!(locator.snapshot().generation(), 0);
        assert_eq!(
            locator.handle(25.0, 121.5).status,
            QueryStatus::NotFound(NotFoundReason::DataNotLoaded)
        );
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_loader_config() {
        let result = PointLocator::start(
            sample_source(),
            LoaderConfig::default().with_page_size(0),
            QueryConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(crate::error::TrashPointError::LoaderConfig(_))));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = FlakySource::new(StaticPageSource::new(vec![
            stop_row(1, "Alpha", 25.01, 121.51),
            stop_row(2, "Beta", 25.02, 121.52),
        ]));
        let locator = PointLocator::new(source, LoaderConfig::default(), QueryConfig::default());
        let report = locator.refresh().await.unwrap();
        assert_eq!(report.rows_accepted, 2);

        locator.loader.source().failing.store(true, Ordering::SeqCst);
        let err = locator.refresh().await.unwrap_err();
        assert!(matches!(err, crate::error::TrashPointError::Fetch(_)));

        let snapshot = locator.snapshot();
        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.len(), 2);
        assert!(locator.handle(25.01, 121.51).is_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_use_previous_snapshot_during_refresh() {
        let source = StaticPageSource::new(create_test_rows(&TestDataConfig::minimal()))
            .with_delay(Duration::from_secs(1));
        let locator = Arc::new(PointLocator::new(
            source,
            LoaderConfig::default(),
            QueryConfig::default(),
        ));
        locator.refresh().await.unwrap();
        let before = locator.snapshot();

        let refreshing = tokio::spawn({
            let locator = Arc::clone(&locator);
            async move { locator.refresh().await }
        });

        // the refresh is parked inside its page fetch
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(locator.loader.source().requested_offsets().len(), 2);
        assert_eq!(locator.snapshot().generation(), 1);
        assert!(locator.handle(25.0, 121.5).is_found());

        refreshing.await.unwrap().unwrap();
        assert_eq!(locator.snapshot().generation(), 2);
        // readers holding the old snapshot still see a complete index
        assert_eq!(before.len(), 3);
        assert_eq!(before.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_refresh_runs_periodically() {
        let locator = Arc::new(PointLocator::new(
            StaticPageSource::new(create_test_rows(&TestDataConfig::minimal())),
            LoaderConfig::default(),
            QueryConfig::default(),
        ));

        let handle = Arc::clone(&locator).spawn_refresh(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(locator.snapshot().generation(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(locator.snapshot().generation(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(locator.snapshot().generation(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_info_summary_after_load() {
        let locator = PointLocator::start(sample_source(), LoaderConfig::default(), QueryConfig::default())
            .await
            .unwrap();
        let info = locator.info();
        assert!(info.is_loaded());
        assert_eq!(info.report.as_ref().map(|r| r.rows_rejected), Some(15));
        assert!(info.summary().starts_with("PointLocator snapshot #1 with 735 stops"));
    }
}
