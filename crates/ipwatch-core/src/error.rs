//! Error types for ipwatch
//!
//! This module defines all error types used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ipwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ipwatch
#[derive(Error, Debug)]
pub enum Error {
    /// The resolver could not produce the mandatory IPv4 address
    #[error("Address resolution failed: {0}")]
    ResolutionFailed(String),

    /// The history file exists but cannot be parsed
    ///
    /// Never recovered automatically: acting on it could discard history.
    #[error("History file {} is corrupt: {reason}", path.display())]
    CorruptState {
        /// Path of the unreadable file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// The notification channel rejected or could not be reached
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    /// History store I/O errors
    #[error("History store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client errors (from lookup services)
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::ResolutionFailed(msg.into())
    }

    /// Create a corrupt state error
    pub fn corrupt_state(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptState {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::DeliveryFailed(msg.into())
    }

    /// Create a history store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this error means the persisted history cannot be trusted
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState { .. })
    }
}
