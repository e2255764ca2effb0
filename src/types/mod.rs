// ABOUTME: Validated domain types shared by the store and the session layer.
// ABOUTME: Ports are range-checked; storage keys are derived, never free-form.

mod port;
mod storage_key;

pub use port::{Port, PortError};
pub use storage_key::StorageKey;
