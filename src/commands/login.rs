// ABOUTME: Default command: pick a profile and open an interactive session to it.
// ABOUTME: Without --name, shows the sorted list and prompts until a valid choice or quit.

use sshman::config::{Settings, TransportMode};
use sshman::diagnostics::{Diagnostics, Warning};
use sshman::error::{Error, Result};
use sshman::output::Output;
use sshman::ssh::{HostKeyPolicy, SessionLauncher, Transport};
use sshman::store::{Profile, ProfileStore, Selection};
use std::io::{self, BufRead, Write};

const PROMPT: &str = "> ";

pub struct LoginOptions {
    pub name: Option<String>,
    pub mode: TransportMode,
    pub host_keys: HostKeyPolicy,
}

pub async fn login(
    store: &ProfileStore,
    settings: &Settings,
    options: LoginOptions,
    output: &Output,
) -> Result<()> {
    let profile = match &options.name {
        Some(name) => store
            .get_by_name(name)
            .ok_or_else(|| Error::NotFound(name.clone()))?,
        None => match prompt_selection(store, &mut io::stdin().lock(), output)? {
            Some(profile) => profile,
            None => return Ok(()),
        },
    };

    let mut diag = Diagnostics::default();
    if options.mode == TransportMode::Native && options.host_keys.is_insecure() {
        diag.warn(Warning::insecure_host_key(&profile.address()));
    }
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    output.progress(&format!(
        "→ Connecting to {} ({}) via {}...",
        profile.name,
        profile.address(),
        options.mode
    ));

    let transport = Transport::for_mode(options.mode, options.host_keys);
    let mut launcher = SessionLauncher::new(transport, &settings.default_key);
    let outcome = launcher.launch(profile).await?;
    tracing::debug!(exit_status = ?outcome.exit_status, "session closed");

    Ok(())
}

/// Show the sorted list and read choices until one resolves. `None` means the user quit.
fn prompt_selection<'a>(
    store: &'a ProfileStore,
    input: &mut impl BufRead,
    output: &Output,
) -> Result<Option<&'a Profile>> {
    output.profiles(&store.sorted());
    println!(">>> choose host by name/id");

    let mut line = String::new();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            // stdin closed
            println!();
            return Ok(None);
        }

        let selection = Selection::parse(&line);
        match &selection {
            Selection::Quit => return Ok(None),
            Selection::Empty => continue,
            Selection::Index(index) => match store.select(&selection) {
                Some(profile) => return Ok(Some(profile)),
                None => println!("error: ({index}) not found"),
            },
            Selection::Name(name) => match store.select(&selection) {
                Some(profile) => return Ok(Some(profile)),
                None => println!("error: [{name}] not found"),
            },
        }
    }
}
