// ABOUTME: In-process SSH transport using russh.
// ABOUTME: Handles dialing, host key policy, and authentication before the shell is opened.

use super::credential::{AuthMethod, ResolvedCredential};
use super::error::TransportError;
use super::launcher::{InteractiveTransport, OpenSession, Target};
use super::shell::{self, PtyConfig};
use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{check_known_hosts, check_known_hosts_path};
use russh::keys::{PrivateKeyWithHashAlg, ssh_key};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How the server's host key is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept any host key without verification.
    #[default]
    AcceptAny,
    /// Require the key to be present in a known_hosts file.
    /// `None` uses the default `~/.ssh/known_hosts`.
    KnownHosts(Option<PathBuf>),
}

impl HostKeyPolicy {
    pub fn is_insecure(&self) -> bool {
        matches!(self, HostKeyPolicy::AcceptAny)
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl SshHandler {
    fn new(host: String, port: u16, policy: HostKeyPolicy) -> Self {
        Self { host, port, policy }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let path = match &self.policy {
            HostKeyPolicy::AcceptAny => {
                tracing::warn!(
                    "host key verification disabled: accepting {} key for {}:{}",
                    server_public_key.algorithm(),
                    self.host,
                    self.port
                );
                return Ok(true);
            }
            HostKeyPolicy::KnownHosts(path) => path,
        };

        let check_result = match path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match check_result {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::warn!("host {}:{} not found in known_hosts", self.host, self.port);
                Ok(false)
            }
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::warn!("host key for {}:{} has changed", self.host, self.port);
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("failed to check known_hosts: {}", e);
                Ok(false)
            }
        }
    }
}

/// Embedded SSH client: dial, authenticate, then open a shell with a fixed-size PTY.
#[derive(Debug, Clone)]
pub struct NativeClient {
    host_keys: HostKeyPolicy,
    connect_timeout: Duration,
    pty: PtyConfig,
    forward_stdin: bool,
}

impl NativeClient {
    pub fn new() -> Self {
        Self {
            host_keys: HostKeyPolicy::default(),
            connect_timeout: Duration::from_secs(15),
            pty: PtyConfig::default(),
            forward_stdin: true,
        }
    }

    pub fn host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_keys = policy;
        self
    }

    /// Whether local stdin is copied to the shell. When off the terminal is
    /// left in cooked mode and only remote output is relayed, like `ssh -n`.
    pub fn forward_stdin(mut self, forward: bool) -> Self {
        self.forward_stdin = forward;
        self
    }

    async fn connect(&self, target: &Target) -> Result<Handle<SshHandler>, TransportError> {
        // No inactivity timeout: an idle interactive shell is normal.
        let russh_config = Config {
            inactivity_timeout: None,
            ..Default::default()
        };

        let handler = SshHandler::new(target.host.clone(), target.port, self.host_keys.clone());

        tracing::debug!(address = %target.address(), "dialing");
        tokio::time::timeout(
            self.connect_timeout,
            client::connect(
                Arc::new(russh_config),
                (target.host.as_str(), target.port),
                handler,
            ),
        )
        .await
        .map_err(|_| {
            TransportError::Dial(format!(
                "timed out after {:?} connecting to {}",
                self.connect_timeout,
                target.address()
            ))
        })?
        .map_err(|e| match e {
            russh::Error::UnknownKey => TransportError::HostKeyRejected(target.address()),
            e => TransportError::Dial(e.to_string()),
        })
    }

    async fn authenticate(
        handle: &mut Handle<SshHandler>,
        user: &str,
        credential: &ResolvedCredential,
    ) -> Result<(), TransportError> {
        for method in credential.methods() {
            let result = match method {
                AuthMethod::Password(password) => handle
                    .authenticate_password(user, password)
                    .await
                    .map_err(|e| TransportError::Auth(e.to_string()))?,
                AuthMethod::PublicKey(key) => {
                    let hash_alg = handle
                        .best_supported_rsa_hash()
                        .await
                        .map_err(|e| TransportError::Auth(e.to_string()))?
                        .flatten();

                    handle
                        .authenticate_publickey(
                            user,
                            PrivateKeyWithHashAlg::new(Arc::clone(key), hash_alg),
                        )
                        .await
                        .map_err(|e| TransportError::Auth(e.to_string()))?
                }
            };

            if result.success() {
                tracing::debug!(user, "authenticated");
                return Ok(());
            }
        }

        Err(TransportError::AuthRejected {
            user: user.to_string(),
        })
    }
}

impl Default for NativeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractiveTransport for NativeClient {
    async fn open(
        &self,
        target: &Target,
        credential: &ResolvedCredential,
    ) -> Result<OpenSession, TransportError> {
        let mut handle = self.connect(target).await?;
        Self::authenticate(&mut handle, &target.user, credential).await?;
        let session = shell::start(handle, &self.pty, self.forward_stdin).await?;
        Ok(OpenSession::Shell(session))
    }
}
