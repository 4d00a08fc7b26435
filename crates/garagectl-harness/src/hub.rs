//! Recording hub sink.

use std::sync::{Arc, Mutex, PoisonError};

use garagectl_accessory::HubSink;
use garagectl_core::state::DoorState;

/// Hub double that records every pushed state.
#[derive(Clone, Default)]
pub struct RecordingHub {
    pushed: Arc<Mutex<Vec<DoorState>>>,
}

impl RecordingHub {
    /// Create an empty recording hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// States pushed so far, in order.
    #[must_use]
    pub fn pushed(&self) -> Vec<DoorState> {
        self.pushed.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl HubSink for RecordingHub {
    fn push_current_state(&self, state: DoorState) {
        self.pushed.lock().unwrap_or_else(PoisonError::into_inner).push(state);
    }
}
