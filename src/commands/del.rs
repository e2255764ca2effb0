// ABOUTME: Del command implementation.
// ABOUTME: Removes all profiles sharing a display name.

use sshman::error::{Error, Result};
use sshman::output::Output;
use sshman::store::ProfileStore;

pub fn del(store: &mut ProfileStore, name: &str, output: &Output) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MissingArgument("name"));
    }

    let removed = store.delete_by_name(name)?;
    output.success(&format!("removed {removed} profile(s) named {name}"));
    Ok(())
}
