// ABOUTME: Add command implementation.
// ABOUTME: Validates flags, refuses key collisions unless forced, and saves the profile.

use crate::cli::AddArgs;
use sshman::diagnostics::{Diagnostics, Warning};
use sshman::error::Result;
use sshman::output::Output;
use sshman::store::{Profile, ProfileStore};
use sshman::types::Port;

pub fn add(store: &mut ProfileStore, args: AddArgs, output: &Output) -> Result<()> {
    output.progress(&describe(&args));

    let port = Port::new(args.port)?;
    let profile = Profile::new(args.name, args.host, port, args.user)
        .pass(args.pass)
        .key(args.key)
        .comment(args.comment);
    profile.validate()?;

    let mut diag = Diagnostics::default();
    let conflicts = store.name_conflicts(&profile);
    let name = profile.name.clone();
    let key = profile.storage_key();

    store.insert(profile, args.force)?;

    if !conflicts.is_empty() {
        diag.warn(Warning::duplicate_name(&name, &conflicts));
    }
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    output.success(&format!("saved {key}"));
    Ok(())
}

fn describe(args: &AddArgs) -> String {
    let pass = if args.pass.is_empty() { "" } else { "******" };
    format!(
        "name: {}\nhost: {}\nport: {}\nuser: {}\npass: {}\nkey: {}\nforce: {}\ncomment: {}",
        args.name, args.host, args.port, args.user, pass, args.key, args.force, args.comment
    )
}
