//! Transport frames.

use crate::error::{ProtocolError, ProtocolResult};
use crate::op::Op;
use serde::{Deserialize, Serialize};

/// The unit a transport moves between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// A handshake record.
    Handshake(Op),
    /// An ordinary operation, including `.error` records.
    Op(Op),
    /// End of stream, optionally carrying a closing record.
    End(Option<Op>),
}

impl Frame {
    /// Returns a short name of the frame kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Handshake(_) => "handshake",
            Frame::Op(_) => "op",
            Frame::End(_) => "end",
        }
    }

    /// Returns the record carried by this frame, if any.
    pub fn op(&self) -> Option<&Op> {
        match self {
            Frame::Handshake(op) | Frame::Op(op) => Some(op),
            Frame::End(op) => op.as_ref(),
        }
    }

    /// Encodes to CBOR bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes).map_err(ProtocolError::codec)?;
        Ok(bytes)
    }

    /// Decodes from CBOR bytes.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        ciborium::from_reader(bytes).map_err(ProtocolError::codec)
    }
}
