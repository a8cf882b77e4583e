//! Endpoint protocol state.

use std::fmt;

/// The protocol state of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// No handshake in either direction.
    Init,
    /// Our handshake is set, the peer's is not.
    LocalHandshakeSet,
    /// The peer's handshake is set, ours is not.
    PeerHandshakeSet,
    /// Both handshakes are set.
    Established,
    /// End of stream was signalled.
    Ended,
    /// An error was signalled.
    Errored,
}

impl EndpointState {
    /// Returns the state after our handshake is set.
    pub fn on_local_handshake(self) -> Self {
        match self {
            EndpointState::Init => EndpointState::LocalHandshakeSet,
            EndpointState::PeerHandshakeSet => EndpointState::Established,
            other => other,
        }
    }

    /// Returns the state after the peer's handshake is set.
    pub fn on_peer_handshake(self) -> Self {
        match self {
            EndpointState::Init => EndpointState::PeerHandshakeSet,
            EndpointState::LocalHandshakeSet => EndpointState::Established,
            other => other,
        }
    }

    /// Returns the state after end of stream.
    ///
    /// An errored stream stays errored.
    pub fn on_end(self) -> Self {
        match self {
            EndpointState::Errored => EndpointState::Errored,
            _ => EndpointState::Ended,
        }
    }

    /// Returns the state after an error signal.
    pub fn on_error(self) -> Self {
        EndpointState::Errored
    }

    /// Returns true once the stream has ended or errored.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EndpointState::Ended | EndpointState::Errored)
    }

    /// Returns the state's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointState::Init => "init",
            EndpointState::LocalHandshakeSet => "local_handshake_set",
            EndpointState::PeerHandshakeSet => "peer_handshake_set",
            EndpointState::Established => "established",
            EndpointState::Ended => "ended",
            EndpointState::Errored => "errored",
        }
    }
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
