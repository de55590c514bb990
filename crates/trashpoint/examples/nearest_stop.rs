//! Find the garbage-truck stops closest to a coordinate
//!
//! This example demonstrates the basic lookup flow:
//! - Loading the live dataset (configurable through `TRASHPOINT_*` variables)
//! - Querying a coordinate given on the command line
//! - Rendering every possible outcome
//!
//! ```text
//! cargo run --example nearest_stop -- 25.0330 121.5654
//! ```

use trashpoint::{LoaderConfig, PointLocator, QueryConfigBuilder, QueryStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trashpoint::init_logging(tracing::Level::INFO)?;

    let mut args = std::env::args().skip(1);
    let latitude: f64 = args.next().as_deref().unwrap_or("25.0330").parse()?;
    let longitude: f64 = args.next().as_deref().unwrap_or("121.5654").parse()?;

    let locator = PointLocator::initialize(
        LoaderConfig::from_env()?,
        QueryConfigBuilder::new().max_distance_km(2.0)?.build(),
    )
    .await?;
    println!("{}", locator.info().summary());

    let result = locator.handle(latitude, longitude);
    match result.status {
        QueryStatus::Found => {
            println!("Closest stops to ({latitude}, {longitude}):");
            for (i, stop) in result.matches.iter().enumerate() {
                let record = &stop.record;
                println!(
                    "  {}. {} [{}] {} m, {}",
                    i + 1,
                    record.location_name,
                    record.district.as_deref().unwrap_or("-"),
                    stop.distance_meters(),
                    record.schedule()
                );
                println!("     {}", record.map_url());
            }
        }
        QueryStatus::OutOfRange => {
            if let Some(stop) = result.matches.first() {
                println!(
                    "No stop within 2 km. Closest is {} at {:.1} km",
                    stop.record.location_name, stop.distance_km
                );
            }
        }
        QueryStatus::NotFound(reason) => println!("No result: {reason:?}"),
    }

    Ok(())
}
