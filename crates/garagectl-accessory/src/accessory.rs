//! Per-accessory runtime.
//!
//! # Concurrency
//!
//! Two triggers evaluate the door: the fixed-interval timer task and
//! hub-initiated reads arriving at arbitrary times. Both take the same
//! `tokio::sync::Mutex<Reconciler>`, and the probe runs while the lock is
//! held, so one evaluation's probe-compare-mutate sequence can never
//! interleave with another's. Target writes share the same exclusion
//! domain.
//!
//! # Lifecycle
//!
//! [`DoorAccessory::start`] probes the initial position, derives the
//! initial target, and spawns the timer task. [`DoorAccessory::shutdown`]
//! signals the task and waits for it; an in-flight probe is allowed to
//! complete and its result is discarded without touching state.

use std::sync::Arc;
use std::time::Duration;

use garagectl_core::probe::StateProbe;
use garagectl_core::reconciler::{Reconciler, ReconcilerAction, ReconcilerConfig};
use garagectl_core::state::{DoorState, DoorTarget};
use garagectl_core::transport::RemoteTransport;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::hub::HubSink;

struct Shared<T> {
    probe: StateProbe<T>,
    hub: Arc<dyn HubSink>,
    reconciler: Mutex<Reconciler>,
}

/// A single garage-door accessory instance.
///
/// Constructed once and kept for the process lifetime. All hub operations
/// go through here; the periodic evaluation runs on its own task until
/// [`DoorAccessory::shutdown`].
pub struct DoorAccessory<T: RemoteTransport + 'static> {
    shared: Arc<Shared<T>>,
    shutdown: watch::Sender<bool>,
    poller: Option<JoinHandle<()>>,
}

impl<T: RemoteTransport + 'static> DoorAccessory<T> {
    /// Probe the initial position, derive the initial target, and start
    /// the periodic evaluation task.
    ///
    /// A failing first probe yields an unknown position and therefore an
    /// optimistic `Open` initial target.
    pub async fn start(
        probe: StateProbe<T>,
        hub: Arc<dyn HubSink>,
        config: ReconcilerConfig,
    ) -> Self {
        let initial = probe.query().await;
        info!(position = %initial, "initial position probed");

        let update_frequency = config.update_frequency;
        let shared = Arc::new(Shared {
            probe,
            hub,
            reconciler: Mutex::new(Reconciler::new(initial, config)),
        });

        let (shutdown, shutdown_rx) = watch::channel(false);
        let poller = tokio::spawn(poll_loop(Arc::clone(&shared), shutdown_rx, update_frequency));

        Self { shared, shutdown, poller: Some(poller) }
    }

    /// Hub read: evaluate the current state on demand.
    ///
    /// Unlike the periodic push path, this may report transitional states -
    /// that is exactly what a hub-initiated read is for.
    pub async fn current_state(&self) -> DoorState {
        let mut reconciler = self.shared.reconciler.lock().await;
        let position = self.shared.probe.query().await;
        reconciler.observe(position, now())
    }

    /// Hub read of the commanded target. No probing.
    pub async fn target_state(&self) -> DoorTarget {
        self.shared.reconciler.lock().await.target()
    }

    /// Hub write: record the new target and dispatch the control command.
    ///
    /// Fire-and-forget: actuation is neither awaited for confirmation nor
    /// rolled back on failure, and the inconsistency window is left alone -
    /// the next evaluation observes consistency once the physical door
    /// catches up, or re-extends the window if it does not.
    pub async fn set_target_state(&self, target: DoorTarget) {
        let reconciler = &mut *self.shared.reconciler.lock().await;
        info!(%target, "target state commanded");
        let actions = reconciler.set_target(target);
        run_actions(&self.shared, actions).await;
    }

    /// Obstruction is not modeled; always `false`.
    ///
    /// Deliberate simplification carried from the source accessory.
    #[must_use]
    pub fn obstruction_detected(&self) -> bool {
        false
    }

    /// Stop the periodic evaluation task and wait for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(poller) = self.poller.take() {
            if poller.await.is_err() {
                warn!("evaluation task ended abnormally");
            }
        }
    }
}

impl<T: RemoteTransport + 'static> Drop for DoorAccessory<T> {
    fn drop(&mut self) {
        // Dropping without shutdown() still stops the timer task.
        let _ = self.shutdown.send(true);
    }
}

async fn poll_loop<T: RemoteTransport + 'static>(
    shared: Arc<Shared<T>>,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
) {
    loop {
        tokio::select! {
            () = tokio::time::sleep(period) => {}
            _ = shutdown.changed() => {}
        }
        if *shutdown.borrow() {
            break;
        }

        let mut reconciler = shared.reconciler.lock().await;
        let position = shared.probe.query().await;
        if *shutdown.borrow() {
            // The accessory was torn down while the probe was in flight;
            // discard the observation.
            break;
        }
        let actions = reconciler.tick(position, now());
        run_actions(&shared, actions).await;
    }
    debug!("evaluation task stopped");
}

/// Observation timestamp from the tokio clock, so paused-time tests drive
/// the tolerance window deterministically.
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

async fn run_actions<T: RemoteTransport>(shared: &Shared<T>, actions: Vec<ReconcilerAction>) {
    for action in actions {
        match action {
            ReconcilerAction::PushState(state) => {
                debug!(%state, "pushing settled state to hub");
                shared.hub.push_current_state(state);
            }
            ReconcilerAction::SendCommand(target) => {
                if !shared.probe.command(target).await {
                    // Optimistic: the hub already holds the user's intent.
                    warn!(%target, "control command failed; commanded target stands");
                }
            }
        }
    }
}
