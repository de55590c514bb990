use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::GeoIndex;

/// Holds the currently published [`GeoIndex`].
///
/// Readers clone the `Arc` under a short read lock and then query without
/// holding it, so a reader keeps seeing the snapshot it started with even if a
/// new one is published mid-query.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<GeoIndex>>,
}

impl SnapshotStore {
    /// A store serving the empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<GeoIndex> {
        Arc::clone(&self.current.read())
    }

    /// Replace the served snapshot, stamping it with the next generation.
    pub fn publish(&self, mut index: GeoIndex) -> Arc<GeoIndex> {
        let mut slot = self.current.write();
        index.generation = slot.generation + 1;
        let index = Arc::new(index);
        *slot = Arc::clone(&index);
        debug!(
            generation = index.generation,
            records = index.len(),
            "Published snapshot"
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trashpoint_data::{PointRecord, ServiceTime};

    fn record(id: &str) -> PointRecord {
        PointRecord {
            id: id.to_string(),
            district: None,
            village: None,
            route: None,
            location_name: id.to_string(),
            latitude: 25.0,
            longitude: 121.5,
            arrival_time: ServiceTime::Unavailable,
            departure_time: ServiceTime::Unavailable,
        }
    }

    #[test]
    fn test_starts_empty() {
        let store = SnapshotStore::new();
        let snapshot = store.current();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation(), 0);
    }

    #[test]
    fn test_publish_bumps_generation() {
        let store = SnapshotStore::new();
        store.publish(GeoIndex::from_records(vec![record("a")]));
        let second = store.publish(GeoIndex::from_records(vec![record("b"), record("c")]));

        assert_eq!(second.generation(), 2);
        assert_eq!(store.current().generation(), 2);
        assert_eq!(store.current().len(), 2);
    }

    #[test]
    fn test_held_snapshot_survives_publish() {
        let store = SnapshotStore::new();
        store.publish(GeoIndex::from_records(vec![record("old")]));
        let held = store.current();

        store.publish(GeoIndex::from_records(vec![record("new")]));

        assert_eq!(held.records()[0].id, "old");
        assert_eq!(store.current().records()[0].id, "new");
    }
}
