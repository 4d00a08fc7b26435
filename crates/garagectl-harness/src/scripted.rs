//! Scripted transport doubles.
//!
//! [`ScriptedTransport`] replays a queue of preset responses and records
//! every command it is asked to run. [`FixedTransport`] always returns the
//! same output, which tests can swap at any time to simulate the door
//! moving (or the status source going stale) between evaluations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use garagectl_core::error::TransportError;
use garagectl_core::transport::RemoteTransport;

/// Transport double that replays preset responses in order.
///
/// An exhausted script fails the invocation, which the probe maps to an
/// unknown position - convenient for "status source went dark" tails.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<ScriptedInner>,
}

#[derive(Default)]
struct ScriptedInner {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Create a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_output(&self, output: &str) {
        self.queue(Ok(output.to_string()));
    }

    /// Queue a failed invocation (non-zero remote exit).
    pub fn push_failure(&self) {
        self.queue(Err(TransportError::Failed {
            status: 1,
            stderr: "scripted failure".to_string(),
        }));
    }

    /// Queue a timed-out invocation.
    pub fn push_timeout(&self) {
        self.queue(Err(TransportError::Timeout { after: Duration::from_secs(5) }));
    }

    /// Commands executed so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.inner.commands.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    fn queue(&self, response: Result<String, TransportError>) {
        self.inner
            .responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(response);
    }
}

#[async_trait]
impl RemoteTransport for ScriptedTransport {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        self.inner
            .commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(command.to_string());
        self.inner
            .responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Failed { status: 1, stderr: "script exhausted".to_string() })
            })
    }
}

/// Transport double that always returns the same output.
///
/// Tests change the output with [`FixedTransport::set_output`] to simulate
/// the physical door reaching (or leaving) a position between evaluations.
#[derive(Clone)]
pub struct FixedTransport {
    output: Arc<Mutex<Result<String, ()>>>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FixedTransport {
    /// Create a transport that reports `output` on every invocation.
    #[must_use]
    pub fn new(output: &str) -> Self {
        Self {
            output: Arc::new(Mutex::new(Ok(output.to_string()))),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Change the reported output for subsequent invocations.
    pub fn set_output(&self, output: &str) {
        *self.output.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Ok(output.to_string());
    }

    /// Make subsequent invocations fail.
    pub fn set_failing(&self) {
        *self.output.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Err(());
    }

    /// Commands executed so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.commands.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl RemoteTransport for FixedTransport {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        self.commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(command.to_string());
        match &*self.output.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            Ok(output) => Ok(output.clone()),
            Err(()) => {
                Err(TransportError::Failed { status: 255, stderr: "host unreachable".to_string() })
            }
        }
    }
}
