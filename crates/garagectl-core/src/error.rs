//! Transport error types.

use std::time::Duration;

/// Errors from a single remote command invocation.
///
/// These never cross the probe boundary in steady-state operation: the
/// probe maps every failure to an unknown position and the reconciler's
/// tolerance window does the rest.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport process could not be spawned or awaited.
    #[error("failed to invoke remote transport: {0}")]
    Io(#[from] std::io::Error),

    /// The remote command did not complete within the configured bound.
    #[error("remote command timed out after {after:?}")]
    Timeout {
        /// The timeout that was exceeded.
        after: Duration,
    },

    /// The remote command completed with a non-zero exit status.
    #[error("remote command failed with status {status}: {stderr}")]
    Failed {
        /// Exit status reported by the remote command (`-1` if terminated
        /// by a signal).
        status: i32,
        /// Trimmed stderr of the remote command.
        stderr: String,
    },
}
