//! Replay command implementation.

use std::fmt;
use std::path::Path;
use swarm_opsource::{
    EndpointState, EventKind, MemoryTransport, OpSource, OpSourceConfig, OrderingPolicy,
    SourceError,
};
use swarm_protocol::{Op, ProtocolError, NO_SOURCE};
use swarm_spec::Spec;
use thiserror::Error;
use tracing::info;

/// Errors that abort a replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The op log could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid op.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// The parse failure.
        source: ProtocolError,
    },

    /// The endpoint rejected a call.
    #[error("line {line}: {source}")]
    Rejected {
        /// 1-based line number, 0 for the peer handshake and the final end.
        line: usize,
        /// The endpoint error.
        source: SourceError,
    },
}

/// Counters collected during a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Handshakes emitted.
    pub handshakes: usize,
    /// Operations emitted.
    pub ops: usize,
    /// Final endpoint state.
    pub state: EndpointState,
    /// Frames written to the transport.
    pub written: usize,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Replayed {} handshake(s), {} op(s); {} frame(s) written; final state: {}",
            self.handshakes, self.ops, self.written, self.state
        )
    }
}

/// Runs the replay command.
pub fn run(path: &Path, strict: bool, peer: Option<&str>) -> Result<ReplaySummary, ReplayError> {
    info!(path = %path.display(), strict, "replaying op log");
    let input = std::fs::read_to_string(path)?;
    replay(&input, strict, peer)
}

/// Replays op lines through a fresh endpoint.
///
/// Handshake lines go to `emit_handshake`, every other line to `emit_op`,
/// and the stream is ended once the input is exhausted.
pub fn replay(input: &str, strict: bool, peer: Option<&str>) -> Result<ReplaySummary, ReplayError> {
    let policy = if strict {
        OrderingPolicy::Strict
    } else {
        OrderingPolicy::Permissive
    };
    let config = OpSourceConfig::new("replay")
        .with_debug(true)
        .with_policy(policy);
    let mut source = OpSource::new(config, MemoryTransport::new());
    let mut events = source.subscribe();

    if let Some(peer) = peer {
        let spec = Spec::parse(peer).map_err(|err| ReplayError::Parse {
            line: 0,
            source: err.into(),
        })?;
        let stamp = spec.stamp().unwrap_or(NO_SOURCE).to_string();
        source
            .write_handshake(Op::new(spec, "", stamp), None)
            .map_err(|err| ReplayError::Rejected {
                line: 0,
                source: err,
            })?;
    }

    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let op = Op::parse_line(line, NO_SOURCE).map_err(|err| ReplayError::Parse {
            line: line_no,
            source: err,
        })?;
        let (spec, value, _, _) = op.into_parts();
        let key = spec.to_string();
        let result = if spec.is_handshake() {
            source.emit_handshake(&key, value, None)
        } else {
            source.emit_op(&key, value, None)
        };
        result.map_err(|err| ReplayError::Rejected {
            line: line_no,
            source: err,
        })?;
    }

    source.emit_end().map_err(|err| ReplayError::Rejected {
        line: 0,
        source: err,
    })?;

    let mut summary = ReplaySummary {
        handshakes: 0,
        ops: 0,
        state: source.state(),
        written: source.transport().len(),
    };
    while let Ok(event) = events.try_recv() {
        match event.kind() {
            EventKind::Handshake => summary.handshakes += 1,
            EventKind::Op => summary.ops += 1,
            EventKind::End | EventKind::Error => {}
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOG: &str = "/Swarm#db!A.on\thello\n\n/Model#m1.set\t1\n/Model#m1.set\ttwo\n";

    #[test]
    fn replay_counts_events() {
        let summary = replay(LOG, true, Some("/Swarm#db!B.on")).unwrap();
        assert_eq!(summary.handshakes, 1);
        assert_eq!(summary.ops, 2);
        assert_eq!(summary.state, EndpointState::Ended);
        assert_eq!(summary.written, 1);
    }

    #[test]
    fn strict_replay_rejects_op_before_handshake() {
        let err = replay("/Model#m1.set\t1\n", true, None).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Rejected {
                line: 1,
                source: SourceError::OutOfOrder { .. }
            }
        ));

        let summary = replay("/Model#m1.set\t1\n", false, None).unwrap();
        assert_eq!(summary.ops, 1);
    }

    #[test]
    fn replay_reports_bad_lines() {
        let err = replay("/Swarm#db!A.on\n/Mo del.set\t1\n", false, None).unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn run_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LOG.as_bytes()).unwrap();

        let summary = run(file.path(), false, None).unwrap();
        assert_eq!(summary.ops, 2);
        assert!(summary.to_string().contains("final state: ended"));
    }
}
