//! Error types for DroidDeck

use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// DroidDeck error types
#[derive(Error, Debug)]
pub enum Error {
    /// The external tool binary could not be found
    #[error("{tool} not found")]
    ToolNotFound { tool: String },

    /// The external tool did not finish within its timeout
    #[error("{tool} timed out after {secs}s", secs = .after.as_secs())]
    Timeout { tool: String, after: Duration },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a tool-not-found error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a timeout error
    pub fn timeout(tool: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            tool: tool.into(),
            after,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
