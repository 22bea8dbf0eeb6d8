// ── Snapshot store ──
//
// Holds the published snapshot behind a `watch` channel so readers always
// see a complete tree, plus the optimistic alarm states recorded by
// successful arm/disarm commands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::model::{AlarmState, Snapshot};
use crate::stream::SnapshotStream;

pub(crate) struct SnapshotStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
    /// Optimistic state per partition id, with the instant it was recorded.
    optimistic: DashMap<String, (AlarmState, Instant)>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        let (last_refresh, _) = watch::channel(None);
        Self {
            snapshot,
            optimistic: DashMap::new(),
            last_refresh,
        }
    }

    pub(crate) fn current(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    /// Publish a freshly fetched snapshot.
    ///
    /// `started_at` is when the fetch behind it began. Optimistic states
    /// recorded before that are superseded by the fetched data; states
    /// recorded while the fetch was in flight survive until the next one.
    pub(crate) fn publish(&self, snapshot: Snapshot, started_at: Instant) -> Arc<Snapshot> {
        let before = self.optimistic.len();
        self.optimistic.retain(|_, (_, set_at)| *set_at > started_at);
        let cleared = before - self.optimistic.len();
        if cleared > 0 {
            debug!(cleared, "optimistic states superseded by refresh");
        }

        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(Arc::clone(&snapshot));
        self.last_refresh.send_replace(snapshot.fetched_at);
        snapshot
    }

    pub(crate) fn set_optimistic(&self, partition_id: &str, state: AlarmState) {
        self.optimistic
            .insert(partition_id.to_owned(), (state, Instant::now()));
    }

    pub(crate) fn optimistic(&self, partition_id: &str) -> Option<AlarmState> {
        self.optimistic.get(partition_id).map(|entry| entry.0)
    }

    pub(crate) fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub(crate) fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use tokio::time::Instant;

    use super::SnapshotStore;
    use crate::model::{AlarmState, Snapshot};

    fn fetched() -> Snapshot {
        Snapshot {
            fetched_at: Some(Utc::now()),
            ..Snapshot::empty()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn publish_clears_overrides_older_than_the_fetch() {
        let store = SnapshotStore::new();
        store.set_optimistic("p1", AlarmState::ArmedAway);

        tokio::time::advance(Duration::from_millis(10)).await;
        store.publish(fetched(), Instant::now());

        assert_eq!(store.optimistic("p1"), None);
        assert!(store.last_refresh().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn override_set_during_fetch_survives_its_publish() {
        let store = SnapshotStore::new();
        let started = Instant::now();

        tokio::time::advance(Duration::from_millis(10)).await;
        store.set_optimistic("p1", AlarmState::Disarmed);
        store.publish(fetched(), started);

        assert_eq!(store.optimistic("p1"), Some(AlarmState::Disarmed));
    }

    #[test]
    fn starts_with_empty_snapshot() {
        let store = SnapshotStore::new();
        assert!(store.current().is_empty());
        assert!(store.current().fetched_at.is_none());
        assert!(store.last_refresh().is_none());
    }
}
