// ABOUTME: Output formatting for CLI feedback and profile listings.
// ABOUTME: Supports normal, quiet, and JSON output modes.

use crate::store::Profile;
use serde::Serialize;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Listings and errors only
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                message,
            }),
        }
    }

    /// Print a non-fatal warning to stderr.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => emit_err(&JsonEvent {
                event: "warning",
                message,
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => emit_err(&JsonEvent {
                event: "error",
                message,
            }),
        }
    }

    /// Print profiles in the given order, numbered from 0.
    pub fn profiles(&self, profiles: &[&Profile]) {
        for (index, profile) in profiles.iter().enumerate() {
            match self.mode {
                OutputMode::Normal | OutputMode::Quiet => println!("{}", format_row(index, profile)),
                OutputMode::Json => emit(&ProfileRow::new(index, profile)),
            }
        }
    }
}

/// One listing line: `(idx) [ name ] host:port<TAB>comment`.
pub fn format_row(index: usize, profile: &Profile) -> String {
    format!(
        "{:<4} [ {:<20} ] {:<21}\t{}",
        format!("({index})"),
        profile.name,
        profile.address(),
        profile.comment
    )
}

fn emit<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{json}");
    }
}

fn emit_err<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        eprintln!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
}

/// Listing entry for JSON mode. Secrets are never included.
#[derive(Serialize)]
struct ProfileRow<'a> {
    index: usize,
    name: &'a str,
    host: &'a str,
    port: u16,
    user: &'a str,
    key: &'a str,
    comment: &'a str,
}

impl<'a> ProfileRow<'a> {
    fn new(index: usize, profile: &'a Profile) -> Self {
        Self {
            index,
            name: &profile.name,
            host: &profile.host,
            port: profile.port.get(),
            user: &profile.user,
            key: &profile.key,
            comment: &profile.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;

    #[test]
    fn row_pads_columns() {
        let profile = Profile::new("web1", "10.0.0.5", Port::SSH, "root").comment("frontend");
        assert_eq!(
            format_row(0, &profile),
            "(0)  [ web1                 ] 10.0.0.5:22          \tfrontend"
        );
    }

    #[test]
    fn json_row_omits_password() {
        let profile = Profile::new("db", "db.internal", Port::SSH, "admin").pass("s3cret");
        let json = serde_json::to_string(&ProfileRow::new(3, &profile)).unwrap();
        assert!(json.contains(r#""index":3"#));
        assert!(json.contains(r#""name":"db""#));
        assert!(!json.contains("s3cret"));
    }
}
