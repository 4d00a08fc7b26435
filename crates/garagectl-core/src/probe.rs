//! Status probe and control dispatch.
//!
//! [`StateProbe`] is the only place raw transport output is interpreted.
//! Status text is normalized into [`DoorPosition`] right here at the
//! boundary, and every transport failure degrades to
//! [`DoorPosition::Unknown`] instead of an error - the accessory must stay
//! responsive to hub reads even when the controller host is permanently
//! unreachable.

use tracing::{debug, warn};

use crate::state::{DoorPosition, DoorTarget};
use crate::transport::RemoteTransport;

/// Placeholder in the control command template replaced by the direction
/// word (`open` or `close`).
pub const DIRECTION_PLACEHOLDER: &str = "{direction}";

/// Queries door status and dispatches control commands over a
/// [`RemoteTransport`].
#[derive(Debug)]
pub struct StateProbe<T> {
    transport: T,
    status_command: String,
    control_command: String,
}

impl<T: RemoteTransport> StateProbe<T> {
    /// Create a probe.
    ///
    /// `status_command` is the remote command whose output reports the
    /// door position; `control_command` is a template containing
    /// [`DIRECTION_PLACEHOLDER`].
    pub fn new(
        transport: T,
        status_command: impl Into<String>,
        control_command: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            status_command: status_command.into(),
            control_command: control_command.into(),
        }
    }

    /// Query the current door position.
    ///
    /// One bounded remote invocation. Never fails in steady state: a
    /// transport error or unclassifiable output is reported as
    /// [`DoorPosition::Unknown`] so the reconciler can apply its tolerance
    /// policy instead of the accessory crashing.
    pub async fn query(&self) -> DoorPosition {
        match self.transport.exec(&self.status_command).await {
            Ok(output) => {
                let position = DoorPosition::from_report(&output);
                if position == DoorPosition::Unknown {
                    warn!(output = output.trim(), "unclassifiable status report");
                } else {
                    debug!(%position, "status probe");
                }
                position
            }
            Err(error) => {
                warn!(%error, "status probe failed");
                DoorPosition::Unknown
            }
        }
    }

    /// Dispatch the control command for `target`.
    ///
    /// Fire-and-forget from the hub's perspective: a failure is logged and
    /// reported as `false`, never raised. The commanded intent stands
    /// regardless - the hub already holds it.
    pub async fn command(&self, target: DoorTarget) -> bool {
        let command = self.control_command.replace(DIRECTION_PLACEHOLDER, target.direction());
        debug!(direction = target.direction(), "dispatching control command");
        match self.transport.exec(&command).await {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, direction = target.direction(), "control command failed");
                false
            }
        }
    }
}
