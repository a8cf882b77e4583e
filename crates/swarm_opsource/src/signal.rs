//! Error signal payloads.

use std::error::Error;
use swarm_protocol::Op;

/// Address of error records.
pub const ERROR_SPEC: &str = ".error";

/// Maximum length, in characters, of a message taken from an error value.
pub const MAX_ERROR_LEN: usize = 140;

/// Input accepted by `emit_error` and `write_error`.
///
/// Whatever the input, the signal that crosses the boundary is an
/// operation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// An already built record, passed through as is.
    Record(Op),
    /// A message, addressed `.error` unless `spec` says otherwise.
    ///
    /// `write_error` always addresses messages `.error`.
    Message {
        /// Explicit address.
        spec: Option<String>,
        /// The message.
        message: String,
    },
}

impl ErrorPayload {
    /// Creates a message addressed `.error`.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            spec: None,
            message: message.into(),
        }
    }

    /// Creates a message with an explicit address.
    pub fn with_spec(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Message {
            spec: Some(spec.into()),
            message: message.into(),
        }
    }

    /// Creates a message from an error value.
    ///
    /// Whitespace runs collapse to one space and the message is cut to
    /// [`MAX_ERROR_LEN`] characters.
    pub fn from_error(err: &dyn Error) -> Self {
        Self::message(normalize_message(&err.to_string()))
    }
}

impl From<Op> for ErrorPayload {
    fn from(op: Op) -> Self {
        Self::Record(op)
    }
}

impl From<&str> for ErrorPayload {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<String> for ErrorPayload {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

/// Collapses whitespace runs and truncates to [`MAX_ERROR_LEN`] characters.
pub fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_ERROR_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn from_error_normalizes() {
        let err = io::Error::new(io::ErrorKind::Other, "disk\n\n  full\tagain");
        assert_eq!(
            ErrorPayload::from_error(&err),
            ErrorPayload::message("disk full again")
        );
    }

    #[test]
    fn from_error_truncates() {
        let err = io::Error::new(io::ErrorKind::Other, "x".repeat(500));
        match ErrorPayload::from_error(&err) {
            ErrorPayload::Message { spec, message } => {
                assert!(spec.is_none());
                assert_eq!(message.chars().count(), MAX_ERROR_LEN);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn conversions() {
        assert_eq!(ErrorPayload::from("boom"), ErrorPayload::message("boom"));
        assert_eq!(
            ErrorPayload::with_spec(".fail", "boom"),
            ErrorPayload::Message {
                spec: Some(".fail".into()),
                message: "boom".into(),
            }
        );
    }

    proptest! {
        #[test]
        fn normalized_messages_are_bounded(message in ".{0,400}") {
            let normalized = normalize_message(&message);
            prop_assert!(normalized.chars().count() <= MAX_ERROR_LEN);
            prop_assert!(!normalized.contains("  "));
            prop_assert!(!normalized.contains('\n'));
        }
    }
}
