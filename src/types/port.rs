// ABOUTME: Validated TCP port for SSH endpoints.
// ABOUTME: Rejects 0 and anything above 65535 at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("port cannot be 0")]
    Zero,

    #[error("port {0} exceeds maximum of 65535")]
    OutOfRange(u32),
}

/// A port in `1..=65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Standard SSH port.
    pub const SSH: Port = Port(22);

    pub fn new(value: u32) -> Result<Self, PortError> {
        match value {
            0 => Err(PortError::Zero),
            1..=65535 => Ok(Self(value as u16)),
            _ => Err(PortError::OutOfRange(value)),
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::SSH
    }
}

impl TryFrom<u32> for Port {
    type Error = PortError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
