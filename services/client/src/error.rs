//! services/client/src/error.rs
//!
//! Defines the primary error type for the docdesk client.

use crate::config::ConfigError;
use docdesk_core::ports::PortError;
use docdesk_core::sessions::SessionError;

/// The primary error type for the `docdesk` client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a rejected session operation.
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),

    /// Represents an error while building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading a selected file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
