//! # Swarm Protocol
//!
//! Operation records and wire frames for Swarm operation streams.
//!
//! This crate provides:
//! - `Op`, the immutable operation record `{spec, value, source, patch}`
//! - `Value`, the operation payload
//! - `Patch`, the ordered key/value input a nested patch is built from
//! - `Frame`, the unit a transport moves, with CBOR encoding
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;
mod op;
mod patch;
mod value;

pub use error::{ProtocolError, ProtocolResult};
pub use frame::Frame;
pub use op::{Op, NO_SOURCE};
pub use patch::{KeyValue, Patch, INVALID_PATCH};
pub use swarm_spec::{Spec, SpecError};
pub use value::Value;
