//! Hub-side push interface.

use garagectl_core::state::DoorState;

/// Receives proactive state updates from the accessory.
///
/// The home-automation bridge implements this to forward updates into its
/// characteristic machinery. Only settled states ever arrive here; the
/// periodic evaluation never pushes `Opening`/`Closing`.
pub trait HubSink: Send + Sync {
    /// Deliver a settled current-state update to the hub.
    fn push_current_state(&self, state: DoorState);
}
