//! Success flag plus display text, returned by operations whose failures are
//! reported to the user rather than raised.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a user-facing operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the operation succeeded
    pub success: bool,

    /// Human-readable message, or the tool's own diagnostic text on failure
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<crate::Error> for Outcome {
    fn from(err: crate::Error) -> Self {
        Self::fail(err.to_string())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
