// ABOUTME: Command module aggregator for the sshman CLI.
// ABOUTME: Re-exports list, add, del, and login command handlers.

mod add;
mod del;
mod list;
mod login;

pub use add::add;
pub use del::del;
pub use list::list;
pub use login::{LoginOptions, login};
