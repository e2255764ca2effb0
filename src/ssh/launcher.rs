// ABOUTME: Session launcher state machine and the transport abstraction it drives.
// ABOUTME: Resolves credentials, opens the selected transport, and blocks until the session ends.

use super::client::{HostKeyPolicy, NativeClient};
use super::credential::{AuthStrategy, ResolvedCredential};
use super::error::{Error, Result, TransportError};
use super::external::{ChildSession, ExternalClient};
use super::shell::ShellSession;
use crate::config::TransportMode;
use crate::store::Profile;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

/// Where a session connects, taken from a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl Target {
    /// `user@host`
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Profile> for Target {
    fn from(profile: &Profile) -> Self {
        Self {
            host: profile.host.clone(),
            port: profile.port.get(),
            user: profile.user.clone(),
        }
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Exit status reported by the client process or remote shell, if any.
    pub exit_status: Option<u32>,
}

/// Lifecycle of one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    Connecting,
    Interactive,
    Closed,
    /// Absorbing failure state.
    Failed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Resolving)
                | (Resolving, Connecting)
                | (Resolving, Failed)
                | (Connecting, Interactive)
                | (Connecting, Failed)
                | (Interactive, Closed)
                | (Interactive, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Resolving => "resolving",
            SessionState::Connecting => "connecting",
            SessionState::Interactive => "interactive",
            SessionState::Closed => "closed",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A transport able to establish an interactive session.
#[async_trait]
pub trait InteractiveTransport: Send + Sync {
    /// Connect and authenticate. On success the session is ready to attach to the terminal.
    async fn open(
        &self,
        target: &Target,
        credential: &ResolvedCredential,
    ) -> std::result::Result<OpenSession, TransportError>;
}

/// An established session, not yet attached.
#[derive(Debug)]
pub enum OpenSession {
    Child(ChildSession),
    Shell(ShellSession),
}

impl OpenSession {
    /// Run until the session terminates.
    pub async fn attach(self) -> std::result::Result<SessionOutcome, TransportError> {
        match self {
            OpenSession::Child(child) => child.wait().await,
            OpenSession::Shell(shell) => shell.attach().await,
        }
    }
}

/// The two session strategies.
#[derive(Debug, Clone)]
pub enum Transport {
    External(ExternalClient),
    Native(NativeClient),
}

impl Transport {
    pub fn for_mode(mode: TransportMode, host_keys: HostKeyPolicy) -> Self {
        match mode {
            TransportMode::Ssh => Transport::External(ExternalClient::new()),
            TransportMode::Native => {
                Transport::Native(NativeClient::new().host_key_policy(host_keys))
            }
        }
    }
}

#[async_trait]
impl InteractiveTransport for Transport {
    async fn open(
        &self,
        target: &Target,
        credential: &ResolvedCredential,
    ) -> std::result::Result<OpenSession, TransportError> {
        match self {
            Transport::External(client) => client.open(target, credential).await,
            Transport::Native(client) => client.open(target, credential).await,
        }
    }
}

/// Drives a single session from credential resolution to termination.
///
/// Nothing is retried: the first failure moves the launcher to
/// [`SessionState::Failed`] and is returned to the caller.
#[derive(Debug)]
pub struct SessionLauncher {
    transport: Transport,
    default_key: PathBuf,
    state: SessionState,
}

impl SessionLauncher {
    pub fn new(transport: Transport, default_key: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            default_key: default_key.into(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Establish a session for `profile` and block until it ends.
    pub async fn launch(&mut self, profile: &Profile) -> Result<SessionOutcome> {
        if self.state != SessionState::Idle {
            return Err(Error::AlreadyLaunched(self.state));
        }

        self.transition(SessionState::Resolving);
        let credential = match AuthStrategy::select(profile, &self.default_key).resolve() {
            Ok(credential) => credential,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.transition(SessionState::Connecting);
        let target = Target::from(profile);
        let session = match self.transport.open(&target, &credential).await {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.transition(SessionState::Interactive);
        let outcome = match session.attach().await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.transition(SessionState::Closed);
        Ok(outcome)
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid session transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::debug!(state = %self.state, "session failed: {}", err);
        self.transition(SessionState::Failed);
        err
    }
}
