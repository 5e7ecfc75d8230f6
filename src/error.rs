//! This module defines all error types used throughout the application.

use std::io;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The number field of a record is not three decimal digits
    #[error("Invalid state number: {number:?}")]
    InvalidNumber { number: String },

    /// The type discriminator is not one of the known state types
    #[error("Error processing state {number}: unsupported state type {state_type:?}")]
    UnsupportedType { number: String, state_type: String },

    /// A token of a state token list could not be normalized
    #[error("Invalid state entry at position {position}: {token:?}")]
    InvalidToken { position: usize, token: String },

    /// A state token list has the wrong number of entries
    #[error("Invalid state entry count: expected {expected}, got {actual}")]
    TokenCount { expected: usize, actual: usize },

    /// Level recomputation requires a root state
    #[error("Root state 000 is missing")]
    MissingRoot,

    /// Lookup of a state that is not stored
    #[error("State {0} not found")]
    StateNotFound(String),

    /// JSON (de)serialization errors
    #[error("Parser error: {0}")]
    Parser(String),

    /// Persistence collaborator errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// True for errors produced while decoding or normalizing a single record
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidNumber { .. }
                | Error::UnsupportedType { .. }
                | Error::InvalidToken { .. }
                | Error::TokenCount { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parser(format!("JSON error: {}", err))
    }
}
