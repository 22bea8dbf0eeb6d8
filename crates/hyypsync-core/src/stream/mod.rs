// ── Snapshot subscription ──

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Snapshot;

/// Subscription handle for published snapshots.
///
/// Wraps a `watch::Receiver`, so a slow reader only ever skips to the
/// newest snapshot; it never sees a partially built one.
pub struct SnapshotStream {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(rx: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self { rx }
    }

    /// The snapshot as of the last publish, without marking it seen.
    pub fn current(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }

    /// The newest snapshot, marking it seen.
    pub fn latest(&mut self) -> Arc<Snapshot> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next publish. Returns `None` once the coordinator is
    /// dropped.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Convert into a `Stream` that yields the current snapshot first, then
    /// every later one.
    pub fn into_stream(self) -> WatchStream<Arc<Snapshot>> {
        WatchStream::new(self.rx)
    }
}
