// ABOUTME: Connection profile persisted in the record store.
// ABOUTME: Field names match the on-disk JSON document exactly.

use crate::types::{Port, StorageKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile name cannot be empty")]
    EmptyName,

    #[error("host cannot be empty")]
    EmptyHost,

    #[error("user cannot be empty")]
    EmptyUser,
}

/// A named SSH connection configuration.
///
/// `pass` is overloaded: alongside a `key` it is the key's passphrase,
/// on its own it is a login password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: Port,
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub comment: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: Port,
        user: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            user: user.into(),
            pass: String::new(),
            key: String::new(),
            comment: String::new(),
        }
    }

    pub fn pass(mut self, pass: impl Into<String>) -> Self {
        self.pass = pass.into();
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Key of the slot this profile occupies in the store.
    pub fn storage_key(&self) -> StorageKey {
        StorageKey::new(&self.user, &self.host)
    }

    /// `host:port`, as shown in listings and used for dialing.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the fields `add` requires. Port range is already guaranteed by [`Port`].
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if self.host.is_empty() {
            return Err(ProfileError::EmptyHost);
        }
        if self.user.is_empty() {
            return Err(ProfileError::EmptyUser);
        }
        Ok(())
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &if self.pass.is_empty() { "" } else { "<redacted>" })
            .field("key", &self.key)
            .field("comment", &self.comment)
            .finish()
    }
}
