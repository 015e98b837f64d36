// ── Refresh coordinator ──
//
// Sole writer of the device snapshot. Refreshes are single-flight: a
// trigger that arrives while one is running attaches to it instead of
// starting another, and every attached waiter plus every broadcast
// subscriber sees the same outcome exactly once.
//
// The runtime handle is captured when the coordinator is built (or on
// the first async refresh) so `request_refresh` works from threads that
// are not Tokio workers.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use arc_swap::ArcSwap;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, warn};

use afire_api::CloudClient;

use crate::discovery::discover_devices;
use crate::error::CoreError;
use crate::model::Snapshot;

const EVENT_CHANNEL_SIZE: usize = 16;

/// Outcome of one completed refresh.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Updated(Arc<Snapshot>),
    Failed(Arc<CoreError>),
}

/// Result of the most recently completed refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LastResult {
    #[default]
    Never,
    Success,
    Failed,
}

enum Phase {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshEvent>>,
    },
}

struct State {
    phase: Phase,
    last_result: LastResult,
}

struct Inner {
    client: Arc<CloudClient>,
    snapshot: ArcSwap<Snapshot>,
    state: Mutex<State>,
    events: broadcast::Sender<RefreshEvent>,
    runtime: OnceLock<Handle>,
}

/// Cheaply cloneable handle; all clones share one snapshot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(client: Arc<CloudClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let runtime = OnceLock::new();
        if let Ok(handle) = Handle::try_current() {
            let _ = runtime.set(handle);
        }
        Self {
            inner: Arc::new(Inner {
                client,
                snapshot: ArcSwap::from_pointee(Snapshot::default()),
                state: Mutex::new(State {
                    phase: Phase::Idle,
                    last_result: LastResult::Never,
                }),
                events,
                runtime,
            }),
        }
    }

    /// Latest good snapshot. Never blocks; stays in place while a
    /// refresh is in flight and after a failed one.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.load_full()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.events.subscribe()
    }

    pub fn last_result(&self) -> LastResult {
        self.inner.lock_state().last_result
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.inner.lock_state().phase, Phase::Refreshing { .. })
    }

    /// Trigger a refresh without waiting for it. A no-op if one is
    /// already running, or if no Tokio runtime is known yet.
    pub fn request_refresh(&self) {
        self.begin(None);
    }

    /// Trigger a refresh (or join the running one) and wait for its outcome.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        if let Ok(handle) = Handle::try_current() {
            let _ = self.inner.runtime.set(handle);
        }
        let (tx, rx) = oneshot::channel();
        self.begin(Some(tx));
        match rx.await {
            Ok(RefreshEvent::Updated(snapshot)) => Ok(snapshot),
            Ok(RefreshEvent::Failed(source)) => Err(CoreError::RefreshFailed { source }),
            Err(_) => Err(CoreError::ControllerDisconnected),
        }
    }

    fn begin(&self, waiter: Option<oneshot::Sender<RefreshEvent>>) {
        let Some(runtime) = self.inner.runtime() else {
            warn!("no Tokio runtime available, refresh not started");
            return;
        };

        let mut state = self.inner.lock_state();
        if let Phase::Refreshing { waiters } = &mut state.phase {
            debug!("refresh already in flight, attaching");
            waiters.extend(waiter);
            return;
        }
        state.phase = Phase::Refreshing {
            waiters: waiter.into_iter().collect(),
        };
        drop(state);
        runtime.spawn(run_refresh(Arc::clone(&self.inner)));
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The caller's runtime if it has one, else the captured handle.
    fn runtime(&self) -> Option<Handle> {
        Handle::try_current()
            .ok()
            .or_else(|| self.runtime.get().cloned())
    }
}

async fn run_refresh(inner: Arc<Inner>) {
    let (event, outcome) = match discover_devices(&inner.client).await {
        Ok(devices) => {
            let snapshot = Arc::new(Snapshot::new(devices, inner.client.session().now()));
            inner.snapshot.store(Arc::clone(&snapshot));
            debug!(devices = snapshot.len(), "refresh complete");
            (RefreshEvent::Updated(snapshot), LastResult::Success)
        }
        Err(e) => {
            warn!(error = %e, "refresh failed, keeping last snapshot");
            (RefreshEvent::Failed(Arc::new(e)), LastResult::Failed)
        }
    };

    let waiters = {
        let mut state = inner.lock_state();
        state.last_result = outcome;
        match mem::replace(&mut state.phase, Phase::Idle) {
            Phase::Refreshing { waiters } => waiters,
            Phase::Idle => Vec::new(),
        }
    };

    for waiter in waiters {
        let _ = waiter.send(event.clone());
    }
    let _ = inner.events.send(event);
}
