// ABOUTME: Storage key identifying a profile slot in the record store.
// ABOUTME: Always derived as `user@host`; the display name plays no part.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `user@host` key under which a profile is stored.
///
/// Two profiles with the same user and host map to the same key, whatever
/// their names are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(user: &str, host: &str) -> Self {
        Self(format!("{user}@{host}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
