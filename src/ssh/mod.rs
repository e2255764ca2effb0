// ABOUTME: Credential resolution and interactive session establishment.
// ABOUTME: Sessions run either through the system ssh client or an embedded russh client.

mod client;
mod credential;
mod error;
mod external;
mod launcher;
mod shell;
mod terminal;

pub use client::{HostKeyPolicy, NativeClient};
pub use credential::{AuthMethod, AuthStrategy, ResolvedCredential};
pub use error::{CredentialError, Error, Result, TransportError};
pub use external::{ChildSession, ExternalClient};
pub use launcher::{
    InteractiveTransport, OpenSession, SessionLauncher, SessionOutcome, SessionState, Target,
    Transport,
};
pub use shell::{PtyConfig, ShellSession};
