// ABOUTME: Credential and transport error types for session establishment.
// ABOUTME: Each stage of the native handshake has its own failure variant.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a profile's credential fields into authentication material.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read key {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load key from {path}: {reason}")]
    KeyDecode { path: PathBuf, reason: String },
}

/// Failure while opening or running an interactive session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ssh client failed: {0}")]
    ExternalExit(std::process::ExitStatus),

    #[error("dial error: {0}")]
    Dial(String),

    #[error("dial error: host key for {0} rejected")]
    HostKeyRejected(String),

    #[error("authentication failed for {user}")]
    AuthRejected { user: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("new session error: {0}")]
    SessionOpen(String),

    #[error("request pty error: {0}")]
    PtyRequest(String),

    #[error("start shell error: {0}")]
    ShellStart(String),

    #[error("return error: {0}")]
    Wait(String),

    #[error("return error: remote shell exited with status {0}")]
    RemoteExit(u32),

    #[error("return error: remote shell killed by signal {0}")]
    RemoteSignal(String),

    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("session launcher already used (state: {0})")]
    AlreadyLaunched(super::SessionState),
}

pub type Result<T> = std::result::Result<T, Error>;
