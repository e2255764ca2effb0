// ABOUTME: Diagnostics accumulator for non-fatal warnings during a command.
// ABOUTME: Collects warnings that shouldn't fail the command but should be shown to users.

use crate::types::StorageKey;

/// Collects non-fatal warnings during a command.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A saved profile shares its name with profiles stored under other keys.
    pub fn duplicate_name(name: &str, others: &[StorageKey]) -> Self {
        let keys: Vec<_> = others.iter().map(StorageKey::as_str).collect();
        Self {
            kind: WarningKind::DuplicateName,
            message: format!(
                "name '{}' is also used by {}; lookups by name pick one of them arbitrarily",
                name,
                keys.join(", ")
            ),
        }
    }

    /// Host key verification is off for this session.
    pub fn insecure_host_key(address: &str) -> Self {
        Self {
            kind: WarningKind::InsecureHostKey,
            message: format!("host key for {address} will not be verified"),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Several records answer to the same display name.
    DuplicateName,
    /// The native transport accepts any host key.
    InsecureHostKey,
}
