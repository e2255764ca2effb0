// ABOUTME: Record store error types.
// ABOUTME: Covers reading, parsing, and rewriting the backing file plus add conflicts.

use super::ProfileError;
use crate::types::StorageKey;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read database {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse database {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write database {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode database: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{0} exists")]
    Exists(StorageKey),

    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
