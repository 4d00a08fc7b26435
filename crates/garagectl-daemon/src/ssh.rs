//! Remote command execution over the system `ssh` client.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use garagectl_core::error::TransportError;
use garagectl_core::transport::RemoteTransport;
use tokio::process::Command;
use tracing::debug;

use crate::config::SshConfig;

/// Executes commands on the controller host via the local `ssh` binary.
///
/// Authentication is non-interactive (`BatchMode=yes`) with the configured
/// identity file. Every invocation is bounded by the configured timeout;
/// hitting it surfaces as [`TransportError::Timeout`], which the probe
/// treats as an unknown position rather than an accessory failure.
pub struct SshTransport {
    host: String,
    user: String,
    identity: String,
    timeout: Duration,
}

impl SshTransport {
    /// Build a transport from the daemon's SSH settings.
    #[must_use]
    pub fn new(config: &SshConfig) -> Self {
        Self {
            host: config.host.clone(),
            user: config.user.clone(),
            identity: config.identity.clone(),
            timeout: config.command_timeout(),
        }
    }

    fn arguments(&self, command: &str) -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.timeout.as_secs().max(1)),
            "-i".to_string(),
            self.identity.clone(),
            format!("{}@{}", self.user, self.host),
            command.to_string(),
        ]
    }
}

#[async_trait]
impl RemoteTransport for SshTransport {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        debug!(command, host = %self.host, "running remote command");

        let invocation = Command::new("ssh")
            .args(self.arguments(command))
            .stdin(Stdio::null())
            .output();

        let output = match tokio::time::timeout(self.timeout, invocation).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout { after: self.timeout }),
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(TransportError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
