// ABOUTME: List command implementation.
// ABOUTME: Prints every profile sorted by name with its index.

use sshman::error::Result;
use sshman::output::Output;
use sshman::store::ProfileStore;

pub fn list(store: &ProfileStore, output: &Output) -> Result<()> {
    output.profiles(&store.sorted());
    Ok(())
}
