// ── Snapshot coordinator ──
//
// Owns the remote client and the snapshot store. Pulls the full site tree
// on a fixed interval, serializes fetches so at most one is in flight, and
// lets callers either attach to the current fetch or wait for a fresh one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hyypsync_api::AlarmApi;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::convert::snapshot_from_listing;
use crate::error::CoreError;
use crate::model::{AlarmState, Partition, Snapshot};
use crate::store::SnapshotStore;
use crate::stream::SnapshotStream;

// ── ConnectionState ──────────────────────────────────────────────

/// Coordinator state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Starting,
    Ready,
    /// The session is invalid; refreshing will not succeed until the host
    /// supplies new credentials.
    ReauthRequired,
    Failed,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Fetch sequence numbers. `started > completed` while a fetch is running.
#[derive(Debug, Default)]
struct FetchProgress {
    started: u64,
    completed: u64,
}

type FetchOutcome = Result<Arc<Snapshot>, CoreError>;

/// Periodic puller of the alarm site tree.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    api: Arc<dyn AlarmApi>,
    config: CoordinatorConfig,
    store: SnapshotStore,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    /// Token for the current run. Cancelled on shutdown, and cancelled
    /// then replaced by the next start.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    progress: StdMutex<FetchProgress>,
    /// Held for the whole of a fetch. Stores the outcome of the last one
    /// so callers attached to it can read the result.
    last_outcome: Mutex<Option<FetchOutcome>>,
    fetch_count: AtomicU64,
}

impl Coordinator {
    /// Create a coordinator. Does NOT fetch -- call
    /// [`start()`](Self::start) to run the first refresh and spawn the
    /// periodic task.
    pub fn new(api: Arc<dyn AlarmApi>, config: CoordinatorConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(CoordinatorInner {
                api,
                config,
                store: SnapshotStore::new(),
                connection_state,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
                progress: StdMutex::new(FetchProgress::default()),
                last_outcome: Mutex::new(None),
                fetch_count: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub(crate) fn api(&self) -> &Arc<dyn AlarmApi> {
        &self.inner.api
    }

    /// Record a state transition. Stored even while nobody subscribes.
    fn set_state(&self, state: ConnectionState) {
        self.inner.connection_state.send_replace(state);
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first refresh, then spawn the periodic refresh task.
    ///
    /// The coordinator is not ready until the first refresh succeeds. An
    /// invalid session is returned as-is so the host can re-authenticate;
    /// any other failure is wrapped in [`CoreError::NotReady`].
    ///
    /// Starting again replaces the periodic task of the previous start.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.set_state(ConnectionState::Starting);

        match self.refresh().await {
            Ok(snapshot) => {
                info!(partitions = snapshot.len(), "first refresh complete");
            }
            Err(e) if e.requires_reauth() => {
                warn!(error = %e, "first refresh rejected the session");
                self.set_state(ConnectionState::ReauthRequired);
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "first refresh failed");
                self.set_state(ConnectionState::Failed);
                return Err(CoreError::NotReady {
                    source: Box::new(e),
                });
            }
        }

        let interval = self.inner.config.refresh_interval;
        if !interval.is_zero() {
            let cancel = self.inner.cancel.child_token();
            let previous =
                std::mem::replace(&mut *self.inner.cancel_child.lock().await, cancel.clone());
            previous.cancel();
            let handle = tokio::spawn(refresh_task(self.clone(), interval, cancel));
            let mut handles = self.inner.task_handles.lock().await;
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
            debug!(interval_secs = interval.as_secs(), "periodic refresh scheduled");
        }

        self.set_state(ConnectionState::Ready);
        Ok(())
    }

    /// Stop the periodic task and wait for it to exit.
    ///
    /// The last published snapshot stays readable.
    pub async fn shutdown(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.set_state(ConnectionState::Disconnected);
        debug!("coordinator shut down");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch and publish a new snapshot.
    ///
    /// If a fetch is already running, waits for it and returns its outcome
    /// instead of starting another. On failure the previous snapshot stays
    /// published.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let target = {
            let progress = self.progress();
            if progress.started > progress.completed {
                progress.started
            } else {
                progress.started + 1
            }
        };
        self.refresh_until(target).await
    }

    /// Wait for a fetch that starts after this call.
    ///
    /// Requests that arrive while a fetch is running all wait on the same
    /// follow-up fetch, so a burst of requests costs one extra fetch.
    pub async fn request_refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let target = self.progress().started + 1;
        self.refresh_until(target).await
    }

    async fn refresh_until(&self, target: u64) -> FetchOutcome {
        let mut last_outcome = self.inner.last_outcome.lock().await;

        let completed = self.progress().completed;
        if completed >= target {
            if let Some(outcome) = last_outcome.as_ref() {
                return outcome.clone();
            }
        }

        let seq = {
            let mut progress = self.progress();
            progress.started += 1;
            progress.started
        };

        let outcome = self.fetch_and_publish().await;
        *last_outcome = Some(outcome.clone());
        self.progress().completed = seq;
        outcome
    }

    async fn fetch_and_publish(&self) -> FetchOutcome {
        self.inner.fetch_count.fetch_add(1, Ordering::Relaxed);
        let started_at = Instant::now();
        let fetched_at = Utc::now();

        let api = Arc::clone(&self.inner.api);
        let listing = call_remote(self.inner.config.timeout, async move {
            api.list_sites().await
        })
        .await?;

        let snapshot = snapshot_from_listing(listing, fetched_at)?;
        debug!(partitions = snapshot.len(), "publishing snapshot");
        Ok(self.inner.store.publish(snapshot, started_at))
    }

    fn progress(&self) -> MutexGuard<'_, FetchProgress> {
        self.inner
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one periodic refresh and classify its failure.
    async fn periodic_refresh(&self) {
        match self.refresh().await {
            Ok(snapshot) => {
                debug!(partitions = snapshot.len(), "periodic refresh complete");
                let recovered = *self.inner.connection_state.borrow() != ConnectionState::Ready;
                if recovered {
                    info!("coordinator ready again");
                    self.set_state(ConnectionState::Ready);
                }
            }
            Err(e) if e.requires_reauth() => {
                warn!(error = %e, "periodic refresh rejected the session; re-authentication required");
                self.set_state(ConnectionState::ReauthRequired);
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "periodic refresh failed; retrying next tick");
            }
            Err(e) => {
                warn!(error = %e, "periodic refresh failed; keeping previous snapshot");
            }
        }
    }

    /// Total fetches issued to the remote service.
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetch_count.load(Ordering::Relaxed)
    }

    // ── State observation ────────────────────────────────────────

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.current()
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.connection_state.borrow()
    }

    /// When the published snapshot was fetched.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.store.last_refresh()
    }

    pub fn last_refresh_watch(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.store.subscribe_last_refresh()
    }

    pub fn partition(&self, partition_id: &str) -> Option<Arc<Partition>> {
        self.snapshot().partition(partition_id).cloned()
    }

    /// The displayed alarm state: an optimistic state recorded by a
    /// command since the last fetch started, else the state derived from
    /// the snapshot. `None` once the partition is gone from the snapshot.
    pub fn alarm_state(&self, partition_id: &str) -> Option<AlarmState> {
        let partition = self.partition(partition_id)?;
        let state = self
            .inner
            .store
            .optimistic(partition_id)
            .unwrap_or_else(|| partition.alarm_state(self.inner.config.stay_mode));
        Some(state)
    }

    pub(crate) fn set_optimistic(&self, partition_id: &str, state: AlarmState) {
        debug!(partition = %partition_id, %state, "recording optimistic state");
        self.inner.store.set_optimistic(partition_id, state);
    }
}

// ── Remote calls ─────────────────────────────────────────────────

/// Run a remote call on its own task and wait at most `timeout` for it.
///
/// A caller that times out stops waiting but the spawned call runs to
/// completion, so a command is never issued twice.
pub(crate) async fn call_remote<T, F>(timeout: Duration, call: F) -> Result<T, CoreError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, hyypsync_api::Error>> + Send + 'static,
{
    let handle = tokio::spawn(call);
    match tokio::time::timeout(timeout, handle).await {
        Err(_) => Err(CoreError::Timeout {
            timeout_secs: timeout.as_secs(),
        }),
        Ok(Err(join)) => Err(CoreError::Internal(format!("remote call task failed: {join}"))),
        Ok(Ok(result)) => result.map_err(CoreError::from),
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => coordinator.periodic_refresh().await,
        }
    }
}
