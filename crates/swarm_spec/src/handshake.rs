//! Handshake recognition.

use crate::spec::Spec;

/// Type name of synchronization-capable handshake objects.
pub const HANDSHAKE_TYPE: &str = "Swarm";

/// Operation name carried by handshakes.
pub const HANDSHAKE_OP: &str = "on";

/// Returns true if `spec` addresses a handshake.
///
/// A handshake is a full `/Type#id!stamp.op` token whose type is `Swarm`
/// or `Swarm+Ext` and whose operation is `on`.
pub fn is_handshake(spec: &Spec) -> bool {
    spec.pattern() == "/#!."
        && spec.type_name().is_some_and(is_swarm_type)
        && spec.op() == Some(HANDSHAKE_OP)
}

fn is_swarm_type(name: &str) -> bool {
    match name.strip_prefix(HANDSHAKE_TYPE) {
        Some("") => true,
        Some(rest) => rest.strip_prefix('+').is_some_and(|ext| !ext.is_empty()),
        None => false,
    }
}
