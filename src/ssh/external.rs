// ABOUTME: Session transport that delegates to the system `ssh` client.
// ABOUTME: The child inherits the terminal; the manager just waits for it to exit.

use super::credential::ResolvedCredential;
use super::error::TransportError;
use super::launcher::{InteractiveTransport, OpenSession, SessionOutcome, Target};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Runs `ssh user@host -p port [-i key | -p password]` with inherited stdio.
#[derive(Debug, Clone)]
pub struct ExternalClient {
    program: PathBuf,
}

impl ExternalClient {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ssh"),
        }
    }

    /// Use a different client binary.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Full argument vector passed to the client.
    pub fn args(target: &Target, credential: &ResolvedCredential) -> Vec<String> {
        let mut args = vec![
            target.destination(),
            "-p".to_string(),
            target.port.to_string(),
        ];
        args.extend(credential.ssh_args());
        args
    }
}

impl Default for ExternalClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractiveTransport for ExternalClient {
    async fn open(
        &self,
        target: &Target,
        credential: &ResolvedCredential,
    ) -> Result<OpenSession, TransportError> {
        let args = Self::args(target, credential);
        tracing::debug!(program = %self.program.display(), destination = %target.destination(), "spawning ssh client");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        Ok(OpenSession::Child(ChildSession { child }))
    }
}

/// A running `ssh` child process.
#[derive(Debug)]
pub struct ChildSession {
    child: Child,
}

impl ChildSession {
    pub(super) async fn wait(mut self) -> Result<SessionOutcome, TransportError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| TransportError::Wait(e.to_string()))?;

        if !status.success() {
            return Err(TransportError::ExternalExit(status));
        }

        Ok(SessionOutcome {
            exit_status: status.code().map(|code| code as u32),
        })
    }
}
