//! Error types for the subword library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the subword library.
#[derive(Error, Debug)]
pub enum SubwordError {
    /// Invalid training or tokenizer configuration, raised before any work starts
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Malformed operation record in a model file
    #[error("Corrupt model at line {line}: {reason}")]
    CorruptModel { line: usize, reason: String },

    /// Malformed record in a vocabulary file
    #[error("Corrupt vocabulary at line {line}: {reason}")]
    CorruptVocabulary { line: usize, reason: String },

    /// A merged symbol with no recorded constituents
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SubwordError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }

    /// Build a [`SubwordError::CorruptModel`] for a 1-based line number.
    pub fn corrupt_model(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptModel {
            line,
            reason: reason.into(),
        }
    }

    /// Build a [`SubwordError::CorruptVocabulary`] for a 1-based line number.
    pub fn corrupt_vocabulary(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptVocabulary {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for subword operations.
pub type Result<T> = std::result::Result<T, SubwordError>;
