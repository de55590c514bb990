//! Keep the stop index fresh in the background
//!
//! This example demonstrates:
//! - Sharing one locator between a refresh task and query callers
//! - Observing snapshot generations as reloads land
//!
//! ```text
//! cargo run --example periodic_refresh
//! ```

use std::{sync::Arc, time::Duration};

use trashpoint::{LoaderConfig, PointLocator, QueryConfigBuilder};

const REFRESH_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trashpoint::init_logging(tracing::Level::INFO)?;

    let locator = Arc::new(
        PointLocator::initialize(
            LoaderConfig::from_env()?,
            QueryConfigBuilder::nearest_only().build(),
        )
        .await?,
    );
    let refresher = Arc::clone(&locator).spawn_refresh(REFRESH_PERIOD);

    let mut ticker = tokio::time::interval(Duration::from_secs(15));
    for _ in 0..12 {
        ticker.tick().await;
        let info = locator.info();
        let result = locator.handle(25.0478, 121.5170);
        match result.record() {
            Some(stop) => println!(
                "[snapshot #{}] nearest to Taipei Main Station: {} ({})",
                info.generation,
                stop.location_name,
                stop.schedule()
            ),
            None => println!("[snapshot #{}] {:?}", info.generation, result.status),
        }
    }

    refresher.abort();
    Ok(())
}
