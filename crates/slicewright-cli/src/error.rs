//! CLI error type and exit-code mapping.

use thiserror::Error;

/// Application exit codes. Violations are a distinct outcome from fatal
/// errors so scripts can tell "the tree is dirty" from "the tool broke".
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    SpecError = 4,
    ViolationsFound = 5,
}

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Spec parse/compile failure.
    #[error("{0}")]
    Spec(#[from] slicewright_spec::SpecError),

    /// Skeleton generation failure (marker integrity, templates).
    #[error("{0}")]
    Skeleton(#[from] slicewright_skeleton::SkeletonError),

    /// Infrastructure failure (I/O, config plumbing).
    #[error("{0}")]
    Core(#[from] slicewright_common_core::Error),

    /// Bad command-line or registry configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Lint completed and found violations.
    #[error("{count} violation(s) found")]
    Violations { count: usize },

    /// Batch run completed with failed slices.
    #[error("{failed} of {total} slice(s) failed")]
    BatchFailed { failed: usize, total: usize },

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Map this error to the process exit code.
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Spec(_) => Exit::SpecError,
            Self::Skeleton(_) => Exit::GeneralError,
            Self::Core(e) if e.is_file_system() => Exit::IoError,
            Self::Core(_) => Exit::GeneralError,
            Self::Config(_) => Exit::ConfigError,
            Self::Violations { .. } => Exit::ViolationsFound,
            Self::BatchFailed { .. } => Exit::GeneralError,
            Self::Other(_) => Exit::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        let violations = CliError::Violations { count: 3 };
        assert_eq!(violations.exit_code(), Exit::ViolationsFound);

        let config = CliError::Config("bad registry".to_string());
        assert_eq!(config.exit_code(), Exit::ConfigError);

        let io: CliError = slicewright_common_core::Error::fs("nope", "/x", None).into();
        assert_eq!(io.exit_code(), Exit::IoError);
    }
}
