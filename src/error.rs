//! Error types for uniseq

use crate::types::MoleculeType;
use thiserror::Error;

/// Result type alias for uniseq operations
pub type Result<T> = std::result::Result<T, UniseqError>;

/// Error types that can occur in uniseq
#[derive(Debug, Error)]
pub enum UniseqError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed sequence address (USA)
    #[error("Invalid address '{usa}': {msg}")]
    InvalidAddress {
        /// The address string as given by the caller
        usa: String,
        /// What was wrong with it
        msg: String,
    },

    /// Malformed bracket range suffix, e.g. `[10:20:x]`
    #[error("Invalid range: {msg}")]
    InvalidRange {
        /// What was wrong with the bracket content
        msg: String,
    },

    /// Address named neither a known database nor an openable file
    #[error("Unresolved address '{usa}': not a known database or readable file")]
    Unresolved {
        /// The address string as given by the caller
        usa: String,
    },

    /// A format name given through the API does not exist in the registry
    #[error("Unknown sequence format '{name}'")]
    UnknownFormat {
        /// The offending format name
        name: String,
    },

    /// A forced format's framing check rejected the stream (no fallback allowed)
    #[error("Input does not match forced format '{format}'")]
    FormatMismatch {
        /// Name of the forced format
        format: &'static str,
    },

    /// Every triable format rejected the head of the stream
    #[error("No known sequence format matched the input")]
    NoFormatMatched,

    /// Record's declared molecule type conflicts with a caller constraint
    #[error("Molecule type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// Type required by the caller
        expected: MoleculeType,
        /// Type declared or guessed from the record
        found: MoleculeType,
    },

    /// List-file recursion exceeded the configured bound (self-reference guard)
    #[error("List files nested deeper than {depth} levels (possible self-reference)")]
    ListDepthExceeded {
        /// The configured depth bound
        depth: usize,
    },

    /// Malformed data inside a record a reader had already committed to
    #[error("Invalid {format} record at line {line}: {msg}")]
    InvalidRecord {
        /// Format whose framing was violated
        format: &'static str,
        /// Line number where the violation was detected
        line: usize,
        /// Error message
        msg: String,
    },
}
