//! # Swarm Spec
//!
//! Address tokens for Swarm operation streams.
//!
//! Every replicated operation is addressed by a token of the form
//! `/Type#id!stamp.op`:
//! - `/Type` names the object type, optionally with a `+Ext` suffix
//! - `#id` names the object
//! - `!stamp` is the version stamp of the operation
//! - `.op` is the operation name
//!
//! Each part is optional. Parts may be given in any order but always
//! render in the canonical order above.
//!
//! ```
//! use swarm_spec::Spec;
//!
//! let spec: Spec = "/Swarm#db!A.on".parse().unwrap();
//! assert_eq!(spec.pattern(), "/#!.");
//! assert_eq!(spec.stamp(), Some("A"));
//! assert!(spec.is_handshake());
//! ```
//!
//! This crate performs no I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod handshake;
mod spec;

pub use error::{SpecError, SpecResult};
pub use handshake::{is_handshake, HANDSHAKE_OP, HANDSHAKE_TYPE};
pub use spec::{Part, Spec};
