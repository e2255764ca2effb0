// ABOUTME: Runtime settings: database location, default key, and transport mode.
// ABOUTME: Database path precedence is --db flag, then SSH_MAN_DATABASE, then ~/.sshman/db.json.

use crate::error::{Error, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the database location.
pub const DATABASE_ENV: &str = "SSH_MAN_DATABASE";
/// Database location relative to the home directory.
pub const DEFAULT_DATABASE: &str = ".sshman/db.json";
/// Private key used when a profile names neither password nor key.
pub const DEFAULT_KEY: &str = ".ssh/id_rsa";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PORT: u16 = 22;

/// How an interactive session is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Run the system `ssh` client with the terminal attached.
    #[default]
    Ssh,
    /// Speak SSH in-process and bridge the terminal to a remote shell.
    Native,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Ssh => write!(f, "ssh"),
            TransportMode::Native => write!(f, "native"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Backing file of the record store.
    pub database: PathBuf,
    /// Fallback private key for profiles without credentials.
    pub default_key: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment and home directory.
    pub fn resolve(db_flag: Option<&Path>) -> Result<Self> {
        Self::resolve_with(db_flag, |name| std::env::var(name).ok(), dirs::home_dir())
    }

    /// Resolve settings from an injected environment lookup and home directory.
    pub fn resolve_with(
        db_flag: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let home = home.ok_or(Error::NoHomeDir)?;

        let database = match db_flag.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path.to_path_buf(),
            None => match env(DATABASE_ENV).filter(|v| !v.is_empty()) {
                Some(path) => PathBuf::from(path),
                None => home.join(DEFAULT_DATABASE),
            },
        };

        Ok(Self {
            database,
            default_key: home.join(DEFAULT_KEY),
        })
    }
}
