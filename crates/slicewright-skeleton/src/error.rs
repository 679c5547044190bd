//! Skeleton generation errors.

use thiserror::Error;

use crate::markers::MarkerError;

/// Errors produced while generating or regenerating a slice's files.
#[derive(Debug, Error)]
pub enum SkeletonError {
    /// A preserved-region marker pair in an existing file is corrupt. The
    /// slice's regeneration is aborted before anything is written.
    #[error("marker integrity failure in '{file}': {source}")]
    MarkerIntegrity {
        /// File the corrupt markers were found in.
        file: String,
        #[source]
        source: MarkerError,
    },

    /// No template registered under that name.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    /// A template referenced a variable the renderer did not supply.
    #[error("missing required variable '{var}' for template '{template}'")]
    MissingVariable {
        template: String,
        var: String,
    },

    /// File system failure; fatal, not listable.
    #[error(transparent)]
    Fs(#[from] slicewright_common_core::Error),
}
