//! Error types for address tokens.

use thiserror::Error;

/// Result type for address token operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while parsing an address token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The token does not start with a quant character.
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset in the input.
        offset: usize,
    },

    /// A quant character is not followed by a token body.
    #[error("empty token after '{quant}'")]
    EmptyToken {
        /// The quant introducing the empty part.
        quant: char,
    },

    /// A token body contains characters outside the token alphabet.
    #[error("invalid token {token:?} after '{quant}'")]
    InvalidToken {
        /// The quant introducing the part.
        quant: char,
        /// The rejected token body.
        token: String,
    },

    /// The same part appears twice.
    #[error("part '{quant}' appears more than once")]
    RepeatedPart {
        /// The repeated quant.
        quant: char,
    },
}

impl SpecError {
    /// Creates an invalid token error.
    pub fn invalid_token(quant: char, token: impl Into<String>) -> Self {
        Self::InvalidToken {
            quant,
            token: token.into(),
        }
    }
}
