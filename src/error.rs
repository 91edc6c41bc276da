//! Error types for card loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a card show or startup.
///
/// Per-binding and per-image failures are not represented here; they are
/// local to one widget and live in [`crate::binding`] and [`crate::fetch`].
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Infrastructure
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed {what} JSON: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Card provider
    // ─────────────────────────────────────────────────────────────
    #[error("Card provider error: {message}")]
    Provider { message: String },

    #[error("Card not found: {path}")]
    CardNotFound { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn parse(what: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { what, source }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error came from a malformed document rather than I/O.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
