//! Error types for the bflower translator

use thiserror::Error;

/// Translator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Structural errors
    /// A `]` was found with no open loop to close
    ///
    /// **Triggered by:** a closing bracket at top level
    /// **Example:** `]`, `+]`, `[]]`
    #[error("Unexpected closing bracket at offset {offset}")]
    UnexpectedClosingBracket {
        /// Byte offset of the offending `]`
        offset: usize,
    },

    /// Input ended while at least one loop was still open
    ///
    /// **Triggered by:** a `[` with no matching `]`
    /// **Example:** `[`, `[[]`, `+[>`
    #[error(
        "Unterminated loop at end of input (offset {offset}): bracket opened at offset {opened_at}"
    )]
    UnterminatedLoop {
        /// End-of-input offset (the length of the source)
        offset: usize,
        /// Byte offset of the innermost unclosed `[`
        opened_at: usize,
    },

    // Builder errors
    /// A terminator was appended to a block that already has one
    #[error("Block already terminated: {label}")]
    BlockAlreadyTerminated {
        /// Label of the block
        label: String,
    },

    /// An instruction was emitted with no active block
    #[error("No insertion point: builder cursor is not positioned on a block")]
    NoInsertionPoint,

    /// Post-emission verification rejected the module
    #[error("IR verification failed: {}", .errors.join("; "))]
    VerificationFailed {
        /// Rendered verifier errors
        errors: Vec<String>,
    },

    // Execution errors
    /// The IR executor faulted
    #[error("Execution error: {0}")]
    ExecutionError(String),

    // External errors
    /// Compile options are outside the range the IR can express
    ///
    /// **Triggered by:** a `cell_count` above `i64::MAX`
    #[error("Invalid compile options: {0}")]
    InvalidOptions(String),

    /// Source file could not be read
    #[error("I/O error reading {path}: {message}")]
    IoError {
        /// Path that failed
        path: String,
        /// Underlying error message
        message: String,
    },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Kind of a bracket-matching violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralErrorKind {
    /// `]` with an empty loop stack
    UnexpectedClosingBracket,
    /// Non-empty loop stack at end of input
    UnterminatedLoop,
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Fatal error that cannot be recovered from
    Fatal,
    /// Recoverable error that may be retried
    Recoverable,
    /// Bug in the translator itself
    Internal,
}

impl Error {
    /// Create an execution error with a message
    pub fn execution(msg: impl Into<String>) -> Self {
        Error::ExecutionError(msg.into())
    }

    /// Create a serialization error with a message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Error::Serialization(msg.into())
    }

    /// Returns the structural kind for bracket-matching errors
    pub fn structural_kind(&self) -> Option<StructuralErrorKind> {
        match self {
            Error::UnexpectedClosingBracket { .. } => {
                Some(StructuralErrorKind::UnexpectedClosingBracket)
            }
            Error::UnterminatedLoop { .. } => Some(StructuralErrorKind::UnterminatedLoop),
            _ => None,
        }
    }

    /// Byte offset in the source that triggered the error, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::UnexpectedClosingBracket { offset } | Error::UnterminatedLoop { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::UnexpectedClosingBracket { .. } => ErrorSeverity::Fatal,
            Error::UnterminatedLoop { .. } => ErrorSeverity::Fatal,
            Error::ExecutionError(_) => ErrorSeverity::Fatal,

            Error::InvalidOptions(_) => ErrorSeverity::Recoverable,
            Error::IoError { .. } => ErrorSeverity::Recoverable,
            Error::Serialization(_) => ErrorSeverity::Recoverable,

            Error::BlockAlreadyTerminated { .. } => ErrorSeverity::Internal,
            Error::NoInsertionPoint => ErrorSeverity::Internal,
            Error::VerificationFailed { .. } => ErrorSeverity::Internal,
        }
    }
}

/// Result type for bflower operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_kind() {
        let err = Error::UnexpectedClosingBracket { offset: 3 };
        assert_eq!(
            err.structural_kind(),
            Some(StructuralErrorKind::UnexpectedClosingBracket)
        );
        assert_eq!(err.offset(), Some(3));

        let err = Error::UnterminatedLoop {
            offset: 5,
            opened_at: 1,
        };
        assert_eq!(
            err.structural_kind(),
            Some(StructuralErrorKind::UnterminatedLoop)
        );
        assert_eq!(err.offset(), Some(5));

        assert_eq!(Error::NoInsertionPoint.structural_kind(), None);
    }

    #[test]
    fn test_messages() {
        let err = Error::UnexpectedClosingBracket { offset: 0 };
        assert!(err.to_string().contains("offset 0"));

        let err = Error::VerificationFailed {
            errors: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "IR verification failed: a; b");
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            Error::UnterminatedLoop {
                offset: 1,
                opened_at: 0
            }
            .classify(),
            ErrorSeverity::Fatal
        );
        assert_eq!(Error::NoInsertionPoint.classify(), ErrorSeverity::Internal);
    }
}
