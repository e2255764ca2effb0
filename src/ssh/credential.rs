// ABOUTME: Chooses the authentication strategy for a profile and loads its material.
// ABOUTME: A password next to a key is always that key's passphrase, never a login password.

use super::error::CredentialError;
use crate::store::Profile;
use russh::keys::{PrivateKey, decode_secret_key};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which credential a profile authenticates with. Deciding this does no I/O.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Both `pass` and `key` set: `pass` decrypts the key at `key`.
    KeyWithPassphrase { key_path: PathBuf, passphrase: String },
    /// Only `pass` set: a literal login password.
    Password(String),
    /// No `pass`: the profile's key if set, otherwise the configured default key.
    DefaultKey { key_path: PathBuf },
}

impl AuthStrategy {
    /// Apply the precedence rules, top to bottom.
    pub fn select(profile: &Profile, default_key: &Path) -> Self {
        match (profile.pass.is_empty(), profile.key.is_empty()) {
            (false, false) => AuthStrategy::KeyWithPassphrase {
                key_path: PathBuf::from(&profile.key),
                passphrase: profile.pass.clone(),
            },
            (false, true) => AuthStrategy::Password(profile.pass.clone()),
            (true, false) => AuthStrategy::DefaultKey {
                key_path: PathBuf::from(&profile.key),
            },
            (true, true) => AuthStrategy::DefaultKey {
                key_path: default_key.to_path_buf(),
            },
        }
    }

    /// Key file this strategy reads, if any.
    pub fn key_path(&self) -> Option<&Path> {
        match self {
            AuthStrategy::KeyWithPassphrase { key_path, .. }
            | AuthStrategy::DefaultKey { key_path } => Some(key_path),
            AuthStrategy::Password(_) => None,
        }
    }

    /// Arguments handed to the external `ssh` client for this strategy.
    pub fn ssh_args(&self) -> Vec<String> {
        match self {
            AuthStrategy::Password(password) => vec!["-p".to_string(), password.clone()],
            AuthStrategy::KeyWithPassphrase { key_path, .. }
            | AuthStrategy::DefaultKey { key_path } => {
                vec!["-i".to_string(), key_path.display().to_string()]
            }
        }
    }

    /// Load whatever the strategy needs: read and decode the key, or wrap the password.
    pub fn resolve(self) -> Result<ResolvedCredential, CredentialError> {
        let method = match &self {
            AuthStrategy::Password(password) => AuthMethod::Password(password.clone()),
            AuthStrategy::KeyWithPassphrase {
                key_path,
                passphrase,
            } => {
                let key = load_key(key_path, Some(passphrase.as_str()))?;
                AuthMethod::PublicKey(Arc::new(key))
            }
            AuthStrategy::DefaultKey { key_path } => {
                AuthMethod::PublicKey(Arc::new(load_key(key_path, None)?))
            }
        };

        tracing::debug!(strategy = self.label(), "credential resolved");

        Ok(ResolvedCredential {
            strategy: self,
            methods: vec![method],
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthStrategy::KeyWithPassphrase { .. } => "key-with-passphrase",
            AuthStrategy::Password(_) => "password",
            AuthStrategy::DefaultKey { .. } => "default-key",
        }
    }
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStrategy::KeyWithPassphrase { key_path, .. } => f
                .debug_struct("KeyWithPassphrase")
                .field("key_path", key_path)
                .field("passphrase", &"<redacted>")
                .finish(),
            AuthStrategy::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
            AuthStrategy::DefaultKey { key_path } => f
                .debug_struct("DefaultKey")
                .field("key_path", key_path)
                .finish(),
        }
    }
}

fn load_key(path: &Path, passphrase: Option<&str>) -> Result<PrivateKey, CredentialError> {
    let pem = std::fs::read_to_string(path).map_err(|source| CredentialError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    decode_secret_key(&pem, passphrase).map_err(|e| CredentialError::KeyDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// One way of proving identity to the server.
#[derive(Clone)]
pub enum AuthMethod {
    Password(String),
    PublicKey(Arc<PrivateKey>),
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::PublicKey(key) => write!(f, "PublicKey({})", key.algorithm()),
        }
    }
}

/// Authentication material for one session. Never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    strategy: AuthStrategy,
    methods: Vec<AuthMethod>,
}

impl ResolvedCredential {
    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    /// Methods to try, in order. There is exactly one; no fallback chain is built.
    pub fn methods(&self) -> &[AuthMethod] {
        &self.methods
    }

    pub fn ssh_args(&self) -> Vec<String> {
        self.strategy.ssh_args()
    }
}
