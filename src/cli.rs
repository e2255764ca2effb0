// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use sshman::config::{DEFAULT_PORT, DEFAULT_USER, TransportMode};
use sshman::output::OutputMode;
use sshman::ssh::HostKeyPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sshman")]
#[command(about = "Keep SSH host profiles and open interactive sessions to them")]
#[command(version)]
pub struct Cli {
    /// Database file (overrides SSH_MAN_DATABASE)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Connect to the profile with this name instead of prompting
    #[arg(long)]
    pub name: Option<String>,

    /// How to establish the session
    #[arg(long, value_enum, default_value_t = TransportMode::Ssh)]
    pub mode: TransportMode,

    /// Verify host keys against known_hosts in native mode (default file if no PATH)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub known_hosts: Option<Option<PathBuf>>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print listings and errors
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    pub fn host_key_policy(&self) -> HostKeyPolicy {
        match &self.known_hosts {
            None => HostKeyPolicy::AcceptAny,
            Some(path) => HostKeyPolicy::KnownHosts(path.clone()),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List profiles sorted by name
    #[command(visible_alias = "l")]
    List,

    /// Add or replace a profile
    Add(AddArgs),

    /// Delete every profile with the given name
    Del {
        /// Profile name
        #[arg(long, default_value_t)]
        name: String,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Display name
    #[arg(long, default_value_t)]
    pub name: String,

    /// Address or hostname
    #[arg(long, default_value_t)]
    pub host: String,

    /// SSH port
    #[arg(long, default_value_t = u32::from(DEFAULT_PORT))]
    pub port: u32,

    /// Remote login user
    #[arg(long, default_value_t = DEFAULT_USER.to_string())]
    pub user: String,

    /// Password, or the key's passphrase when --key is also given
    #[arg(long, default_value_t)]
    pub pass: String,

    /// Private key file (default key is used when empty)
    #[arg(long, default_value_t)]
    pub key: String,

    /// Free-text note shown in listings
    #[arg(long, default_value_t)]
    pub comment: String,

    /// Overwrite an existing profile with the same user@host
    #[arg(long)]
    pub force: bool,
}
