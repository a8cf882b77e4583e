//! Error types for the endpoint.

use crate::state::EndpointState;
use std::fmt;
use swarm_protocol::ProtocolError;
use swarm_spec::SpecError;
use thiserror::Error;

/// Result type for endpoint operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type reported by transports through completion callbacks.
pub type TransportResult<T> = Result<T, TransportError>;

/// Which handshake slot a repeat was attempted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Our own handshake, set by `emit_handshake`.
    Local,
    /// The peer's handshake, set by `write_handshake`.
    Peer,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => f.write_str("local"),
            Side::Peer => f.write_str("peer"),
        }
    }
}

/// Errors raised synchronously by endpoint calls.
///
/// These describe local misuse of the endpoint. Faults reported by the
/// peer are never raised; they arrive as `.error` records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// A handshake slot was set twice.
    #[error("handshake repeat ({side})")]
    HandshakeRepeat {
        /// The slot that was already set.
        side: Side,
    },

    /// A patch argument was not an ordered sequence of key/value pairs.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// A handshake call carried a non-handshake address.
    #[error("not a handshake address: {spec}")]
    NotHandshake {
        /// The rejected address.
        spec: String,
    },

    /// A call arrived before the handshake it depends on.
    #[error("{action} not allowed in state {state}")]
    OutOfOrder {
        /// State of the endpoint at the time of the call.
        state: EndpointState,
        /// The rejected call.
        action: &'static str,
    },

    /// A call arrived after the stream ended or errored.
    #[error("{action} after stream closed ({state})")]
    Closed {
        /// Terminal state of the endpoint.
        state: EndpointState,
        /// The rejected call.
        action: &'static str,
    },

    /// An address token failed to parse.
    #[error("invalid address: {0}")]
    Spec(#[from] SpecError),

    /// Any other protocol-level failure.
    #[error("protocol error: {0}")]
    Protocol(ProtocolError),
}

impl SourceError {
    /// Returns true if the error reflects a broken stream order rather
    /// than malformed input.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            SourceError::HandshakeRepeat { .. }
                | SourceError::OutOfOrder { .. }
                | SourceError::Closed { .. }
        )
    }
}

impl From<ProtocolError> for SourceError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidPatch(message) => SourceError::InvalidPatch(message),
            ProtocolError::Spec(err) => SourceError::Spec(err),
            other => SourceError::Protocol(other),
        }
    }
}

/// Errors a transport reports through a completion callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport is not connected.
    #[error("transport disconnected")]
    Disconnected,

    /// The receiving side of the transport is gone.
    #[error("transport closed")]
    Closed,

    /// Transport-specific failure.
    #[error("transport failure: {0}")]
    Failed(String),
}
