//! Remote transport abstraction.
//!
//! Abstracts over "run one command on the controller host and give me its
//! output". Production uses an `ssh` child process; tests use scripted
//! doubles from the harness crate. The core treats the transport as opaque:
//! host, user, key material, and command strings are all supplied by
//! configuration outside this crate.

use async_trait::async_trait;

use crate::error::TransportError;

/// Executes a single remote command on the controller host.
///
/// Implementations must bound the call (network plus remote process) with a
/// conservative timeout; a hung invocation must not stall the evaluation
/// timer forever. No retries: the reconciler's tolerance window is the
/// retry mechanism at the state-machine level.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Run `command` on the remote host and return its standard output.
    async fn exec(&self, command: &str) -> Result<String, TransportError>;
}
