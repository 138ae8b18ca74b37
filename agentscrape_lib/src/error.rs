//! Error types for the library layer.
//!
//! Page content never produces an error: malformed fragments are skipped
//! during extraction. These variants cover caller-supplied input and
//! rendering of finished records.

use std::fmt;

/// Errors produced by validation and record rendering.
#[derive(Debug)]
pub enum AgentScrapeError {
    /// User-provided input failed validation.
    InvalidInput(String),
    /// JSON serialization of records failed.
    Serialization(serde_json::Error),
}

impl fmt::Display for AgentScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for AgentScrapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<serde_json::Error> for AgentScrapeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
