//! # Swarm Op Source
//!
//! The protocol endpoint of one Swarm peer connection.
//!
//! An [`OpSource`] mediates all traffic of a connection in both directions:
//! - **emit** (inbound, toward the consumer): `emit_handshake`, `emit_op`,
//!   `emit_end`, `emit_error` turn raw input into immutable [`Op`] records
//!   and publish them as [`OpSourceEvent`]s
//! - **write** (outbound, toward the wire): `write_handshake`, `write`,
//!   `write_end`, `write_error` validate and log, then delegate to an
//!   [`OpTransport`]
//!
//! ## Key Invariants
//!
//! - Each direction carries at most one handshake
//! - Patches are ordered sequences; their sub-operations share the
//!   parent's type and id
//! - Errors crossing the boundary are always `.error` operation records
//! - Protocol misuse fails synchronously; peer faults are data
//!
//! ## Example
//!
//! ```
//! use swarm_opsource::{EventKind, MemoryTransport, OpSource, OpSourceConfig};
//!
//! let transport = MemoryTransport::new();
//! let mut source = OpSource::new(OpSourceConfig::new("client"), transport.clone());
//! let mut events = source.subscribe();
//!
//! source.emit_handshake("/Swarm#db!A.on", "", None).unwrap();
//! source.emit_op("/Model#m1.set", 42i64, None).unwrap();
//!
//! assert_eq!(events.try_recv().unwrap().kind(), EventKind::Handshake);
//! let op = events.try_recv().unwrap().into_op().unwrap();
//! assert_eq!(op.source(), "A");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod diagnostics;
mod error;
mod event;
mod signal;
mod source;
mod state;
mod transport;

pub use config::{OpSourceConfig, OrderingPolicy};
pub use diagnostics::{diagnostic_line, label, Tag, LOG_TARGET};
pub use error::{Side, SourceError, SourceResult, TransportError, TransportResult};
pub use event::{EventKind, EventReceiver, Listener, OpSourceEvent};
pub use signal::{normalize_message, ErrorPayload, ERROR_SPEC, MAX_ERROR_LEN};
pub use source::{default_spec, OpSource, DEFAULT_SPEC};
pub use state::EndpointState;
pub use transport::{
    channel_transport, complete, Callback, ChannelTransport, FrameReceiver, MemoryTransport,
    NullTransport, OpTransport,
};

pub use swarm_protocol::{Frame, KeyValue, Op, Patch, Value};
pub use swarm_spec::Spec;
