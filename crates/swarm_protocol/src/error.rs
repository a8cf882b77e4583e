//! Error types for the protocol crate.

use swarm_spec::SpecError;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while building or coding operation records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A patch argument was not an ordered sequence of key/value pairs.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// An address token failed to parse.
    #[error("invalid address: {0}")]
    Spec(#[from] SpecError),

    /// CBOR encoding or decoding failed.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the codec error.
        message: String,
    },

    /// A text line is not of the form `spec<TAB>value`.
    #[error("malformed op line: {line:?}")]
    MalformedLine {
        /// The rejected line.
        line: String,
    },
}

impl ProtocolError {
    /// Creates a codec error.
    pub fn codec(message: impl ToString) -> Self {
        Self::Codec {
            message: message.to_string(),
        }
    }
}
