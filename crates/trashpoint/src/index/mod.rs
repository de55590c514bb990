//! In-memory point index.
//!
//! A [`GeoIndex`] is one immutable snapshot of the loaded stops. Queries run a
//! full linear scan; the dataset is a few thousand points so there is no
//! spatial acceleration structure. Published snapshots live in a
//! [`SnapshotStore`] and are replaced wholesale on reload.

mod snapshot;

use chrono::{DateTime, Utc};
use trashpoint_data::{LoadReport, PointRecord};

use crate::distance::distance_km;

pub use snapshot::SnapshotStore;

/// A record together with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Neighbor {
    pub record: PointRecord,
    pub distance_km: f64,
}

impl Neighbor {
    /// Distance rounded to whole meters, for display.
    pub fn distance_meters(&self) -> u64 {
        (self.distance_km * 1000.0).round() as u64
    }
}

/// One complete, immutable set of stops.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    records: Vec<PointRecord>,
    report: Option<LoadReport>,
    loaded_at: Option<DateTime<Utc>>,
    pub(crate) generation: u64,
}

impl GeoIndex {
    /// The snapshot served before any load has succeeded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from a completed load.
    pub fn new(records: Vec<PointRecord>, report: LoadReport) -> Self {
        Self {
            records,
            report: Some(report),
            loaded_at: Some(Utc::now()),
            generation: 0,
        }
    }

    /// Build a snapshot from records that did not come through a loader.
    pub fn from_records(records: Vec<PointRecord>) -> Self {
        Self {
            records,
            report: None,
            loaded_at: Some(Utc::now()),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in load order.
    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Increases by one with every published snapshot; 0 until the first publish.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The single closest record.
    ///
    /// The running best is only replaced on a strictly smaller distance, so
    /// the earliest record in load order wins a tie.
    pub fn nearest(&self, latitude: f64, longitude: f64) -> Option<Neighbor> {
        let mut best: Option<(usize, f64)> = None;
        for (i, record) in self.records.iter().enumerate() {
            let d = distance_km(latitude, longitude, record.latitude, record.longitude);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        best.map(|(i, distance_km)| Neighbor {
            record: self.records[i].clone(),
            distance_km,
        })
    }

    /// Up to `k` records ordered by ascending distance, ties in load order.
    pub fn query_nearest(&self, latitude: f64, longitude: f64, k: usize) -> Vec<Neighbor> {
        match k {
            0 => return Vec::new(),
            1 => return self.nearest(latitude, longitude).into_iter().collect(),
            _ => {}
        }

        let mut ranked: Vec<(usize, f64)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, distance_km(latitude, longitude, r.latitude, r.longitude)))
            .collect();
        // sort_by is stable, which keeps equal distances in load order
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        ranked
            .into_iter()
            .take(k)
            .map(|(i, distance_km)| Neighbor {
                record: self.records[i].clone(),
                distance_km,
            })
            .collect()
    }
}
