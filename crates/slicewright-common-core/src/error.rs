//! Error types shared across slicewright crates.

use thiserror::Error;

/// The main error type for slicewright infrastructure operations.
///
/// Component-specific failures (spec parsing, marker integrity, lint
/// findings) have their own types in their own crates; this covers the
/// plumbing underneath them.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error with custom message.
    #[error("{0}")]
    Generic(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system error with the offending path.
    #[error("File system error: {message} ({path})")]
    FileSystem {
        /// Human-readable description.
        message: String,
        /// The path the operation was acting on.
        path: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a new generic error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new file system error for a path.
    pub fn fs(
        message: impl Into<String>,
        path: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: path.into(),
            source,
        }
    }

    /// Whether this error originated in the file system layer.
    pub fn is_file_system(&self) -> bool {
        matches!(self, Self::Io(_) | Self::FileSystem { .. })
    }
}

/// Result type alias using slicewright's Error.
pub type Result<T> = std::result::Result<T, Error>;
