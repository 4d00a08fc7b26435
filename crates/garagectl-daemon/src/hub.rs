//! Logging hub sink.

use garagectl_accessory::HubSink;
use garagectl_core::state::DoorState;
use tracing::info;

/// Forwards settled-state pushes to the log.
///
/// Stands in for the home-automation bridge, which is outside this
/// daemon's scope; a bridge replaces this with a real characteristic
/// update.
pub struct TracingHub {
    name: String,
}

impl TracingHub {
    /// Create a sink labeled with the accessory name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl HubSink for TracingHub {
    fn push_current_state(&self, state: DoorState) {
        info!(accessory = %self.name, %state, "current state update");
    }
}
