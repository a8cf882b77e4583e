//! Diagnostic lines.

use std::fmt;
use swarm_protocol::Op;

/// Tracing target of diagnostic lines.
pub const LOG_TARGET: &str = "swarm::opsource";

/// Tag marking non-ordinary events in a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// A handshake.
    Handshake,
    /// End of stream.
    End,
    /// An error signal.
    Error,
}

impl Tag {
    /// Returns the tag text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Handshake => "HS",
            Tag::End => "END",
            Tag::Error => "ERROR",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders `"<ours><dir><peer>"`, with `?` for unknown stamps.
///
/// The direction is `<` for inbound and `>` for outbound.
pub fn label(ours: Option<&str>, inbound: bool, peer: Option<&str>) -> String {
    format!(
        "{}{}{}",
        ours.unwrap_or("?"),
        if inbound { '<' } else { '>' },
        peer.unwrap_or("?")
    )
}

/// Renders `<label>\t[<TAG>]\t<address>\t<value>`.
///
/// The tag and the record parts are left out when absent.
pub fn diagnostic_line(label: &str, tag: Option<Tag>, op: Option<&Op>) -> String {
    let mut line = label.to_string();
    if let Some(tag) = tag {
        line.push_str(&format!("\t[{tag}]"));
    }
    if let Some(op) = op {
        line.push_str(&format!("\t{}\t{}", op.spec(), op.value()));
    }
    line
}
