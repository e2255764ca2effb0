// ABOUTME: Library root for sshman - exposes the store and session layers for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod ssh;
pub mod store;
pub mod types;
