// ABOUTME: Entry point for the sshman CLI application.
// ABOUTME: Parses arguments, opens the profile store, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::LoginOptions;
use sshman::config::Settings;
use sshman::error::Result;
use sshman::output::Output;
use sshman::store::ProfileStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output_mode());
    let code = match run(cli, &output).await {
        Ok(()) => 0,
        Err(e) => {
            output.error(&e.to_string());
            e.exit_code()
        }
    };

    // Exit directly: a pending stdin read from the session bridge must not hold up shutdown.
    std::process::exit(code);
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let settings = Settings::resolve(cli.db.as_deref())?;
    tracing::debug!(database = %settings.database.display(), "opening profile store");
    let mut store = ProfileStore::open(&settings.database)?;

    let host_keys = cli.host_key_policy();
    match cli.command {
        Some(Commands::List) => commands::list(&store, output),
        Some(Commands::Add(args)) => commands::add(&mut store, args, output),
        Some(Commands::Del { name }) => commands::del(&mut store, &name, output),
        None => {
            let options = LoginOptions {
                name: cli.name,
                mode: cli.mode,
                host_keys,
            };
            commands::login(&store, &settings, options, output).await
        }
    }
}
