//! Spec parsing and compilation errors.
//!
//! Every variant carries the 1-based line number of the offending input so
//! batch callers can report precisely which line of which spec broke, and
//! keep processing the rest.

use thiserror::Error;

/// Errors produced while parsing a spec document.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A required section is missing, out of order, duplicated, or a line
    /// does not fit its section's grammar.
    #[error("spec format error at line {line}: {message}")]
    Format {
        /// 1-based line number of the offending line.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A declared type does not fully match the type grammar.
    #[error("unknown type at line {line}: '{expr}': {reason}")]
    UnknownType {
        /// 1-based line number of the offending line.
        line: usize,
        /// The type expression as written.
        expr: String,
        /// Why the grammar rejected it.
        reason: String,
    },

    /// An error code appears more than once within a single spec.
    #[error("duplicate error code at line {line}: {code}")]
    DuplicateErrorCode {
        /// 1-based line number of the repeated declaration.
        line: usize,
        /// The repeated code.
        code: String,
    },
}

impl SpecError {
    /// The line the error points at.
    pub fn line(&self) -> usize {
        match self {
            Self::Format { line, .. }
            | Self::UnknownType { line, .. }
            | Self::DuplicateErrorCode { line, .. } => *line,
        }
    }

    /// Shorthand for a format error.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}
