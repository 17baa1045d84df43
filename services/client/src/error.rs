//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use podcast_muse_core::ports::PortError;
use podcast_muse_core::wizard::GateError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A wizard step refused to move.
    #[error("{0}")]
    Gate(#[from] GateError),

    /// Represents a standard Input/Output error (e.g., reading from the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A form or page rejected its input.
    #[error("{0}")]
    Rejected(String),
}
