// ABOUTME: Application-wide error types for sshman.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::ssh;
use crate::store::{ProfileError, StoreError};
use crate::types::PortError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot determine home directory")]
    NoHomeDir,

    #[error("missing required flag: --{0}")]
    MissingArgument(&'static str),

    #[error("params error: {0}")]
    InvalidPort(#[from] PortError),

    #[error("params error: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ssh(#[from] ssh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status: 2 for credential and transport failures, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Ssh(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
