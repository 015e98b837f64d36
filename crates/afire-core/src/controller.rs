// ── Controller abstraction ──
//
// Lifecycle management for one cloud account. Owns the client handle,
// the refresh coordinator and the background timer, and routes every
// write through the power guard before it reaches the cloud.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use afire_api::CloudClient;

use crate::command::{Command, CommandPlan, CommandResult, GuardedCommand, RequestedValue};
use crate::config::{ControllerConfig, StalePolicy};
use crate::coordinator::{LastResult, RefreshCoordinator, RefreshEvent};
use crate::discovery::discover_devices;
use crate::error::CoreError;
use crate::model::{DeviceDescriptor, Snapshot};

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Pass clones to every
/// consumer that needs the snapshot or issues commands; there is no
/// process-wide client.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: Arc<CloudClient>,
    coordinator: RefreshCoordinator,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    /// Token for the current connection. Cancelled on disconnect and
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a Controller with a fresh client. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start polling.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a Controller around an existing client (custom clock or
    /// HTTP stack).
    pub fn with_client(config: ControllerConfig, client: Arc<CloudClient>) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        Self {
            inner: Arc::new(ControllerInner {
                coordinator: RefreshCoordinator::new(Arc::clone(&client)),
                config,
                client,
                connection_state,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<CloudClient> {
        &self.inner.client
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    // ── Setup validation ─────────────────────────────────────────

    /// Check a configuration before accepting it: one login and one
    /// discovery on a fresh client. An account with no fireplaces fails.
    pub async fn validate(config: &ControllerConfig) -> Result<Vec<DeviceDescriptor>, CoreError> {
        let client = config.build_client()?;
        client.login().await?;
        let devices = discover_devices(&client).await?;
        if devices.is_empty() {
            return Err(CoreError::NoDevices);
        }
        info!(devices = devices.len(), "configuration validated");
        Ok(devices)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Authenticate, load the first snapshot, and start the refresh timer.
    ///
    /// Calling this again replaces the running timer rather than adding
    /// a second one.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let child = self.inner.cancel.child_token();
        let previous = std::mem::replace(&mut *self.inner.cancel_child.lock().await, child.clone());
        previous.cancel();

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        if let Err(e) = self.initial_load().await {
            let _ = self.inner.connection_state.send(ConnectionState::Failed);
            return Err(e);
        }

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        let interval = self.inner.config.refresh_interval;
        if !interval.is_zero() {
            let coordinator = self.inner.coordinator.clone();
            handles.push(tokio::spawn(refresh_task(coordinator, interval, child)));
        }
        drop(handles);

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(
            devices = self.snapshot().len(),
            "connected to fireplace cloud"
        );
        Ok(())
    }

    async fn initial_load(&self) -> Result<(), CoreError> {
        self.inner.client.login().await?;
        debug!("login successful");
        self.inner.coordinator.refresh().await?;
        Ok(())
    }

    /// Stop the refresh timer and wait for it to exit.
    pub async fn disconnect(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// One-shot: connect without a timer, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval = Duration::ZERO;

        let controller = Controller::new(cfg)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.coordinator.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.coordinator.subscribe()
    }

    pub fn request_refresh(&self) {
        self.inner.coordinator.request_refresh();
    }

    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        self.inner.coordinator.refresh().await
    }

    pub fn last_result(&self) -> LastResult {
        self.inner.coordinator.last_result()
    }

    /// Whether a device should be presented as available, per the
    /// configured [`StalePolicy`].
    pub fn is_available(&self, device_id: &str) -> bool {
        if !self.snapshot().contains(device_id) {
            return false;
        }
        match self.inner.config.stale_policy {
            StalePolicy::KeepLastKnown => true,
            StalePolicy::MarkUnavailable => self.last_result() != LastResult::Failed,
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Write one attribute with its classified value.
    pub async fn issue_command(
        &self,
        device_id: &str,
        attribute: &str,
        value: impl Into<RequestedValue>,
    ) -> Result<CommandResult, CoreError> {
        let plan = CommandPlan::single(GuardedCommand::plan(device_id, attribute, value.into())?);
        self.dispatch(plan).await
    }

    /// Execute a high-level command against one device.
    pub async fn execute(&self, device_id: &str, cmd: Command) -> Result<CommandResult, CoreError> {
        self.dispatch(cmd.plan(device_id)?).await
    }

    async fn dispatch(&self, plan: CommandPlan) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let snapshot = self.snapshot();
        let device = snapshot
            .view(plan.device_id())
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: plan.device_id().to_owned(),
            })?;

        if let Some(guarded) = plan.guarded().filter(|_| !device.is_powered()) {
            warn!(
                device = plan.device_id(),
                attribute = %guarded.attribute,
                "fireplace is off, rejecting command"
            );
            return Err(CoreError::CommandRejected {
                device_id: plan.device_id().to_owned(),
                attribute: guarded.attribute.clone(),
            });
        }

        let client = &self.inner.client;
        let mut result = CommandResult {
            device_id: plan.device_id().to_owned(),
            sent: Vec::with_capacity(2),
            acknowledgements: Vec::with_capacity(2),
        };

        let ack = client
            .set_device_attributes(&plan.primary.device_id, &plan.primary.attributes())
            .await?;
        debug!(
            device = plan.device_id(),
            attribute = %plan.primary.attribute,
            value = plan.primary.value,
            "attribute written"
        );
        result.acknowledgements.push(ack);
        result.sent.push(plan.primary);

        let companion = match plan.companion {
            Some(companion) => {
                let attrs = companion.attributes();
                let written = client
                    .set_device_attributes(&companion.device_id, &attrs)
                    .await;
                written.map(|ack| Some((companion, ack)))
            }
            None => Ok(None),
        };

        // The primary write landed; converge the snapshot either way.
        self.inner.coordinator.request_refresh();

        if let Some((companion, ack)) = companion? {
            result.acknowledgements.push(ack);
            result.sent.push(companion);
        }
        Ok(result)
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh the snapshot. A failed cycle is logged and the
/// next tick still fires.
async fn refresh_task(
    coordinator: RefreshCoordinator,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = coordinator.refresh() => {
                if let Err(e) = result {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
