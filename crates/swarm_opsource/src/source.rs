//! The operation stream endpoint.

use crate::config::OpSourceConfig;
use crate::diagnostics::{self, Tag, LOG_TARGET};
use crate::error::{Side, SourceError, SourceResult};
use crate::event::{EventHub, EventKind, EventReceiver, OpSourceEvent};
use crate::signal::{ErrorPayload, ERROR_SPEC};
use crate::state::EndpointState;
use crate::transport::{Callback, NullTransport, OpTransport};
use std::fmt;
use std::sync::LazyLock;
use swarm_protocol::{Frame, Op, Patch, Value, NO_SOURCE};
use swarm_spec::Spec;
use tracing::{debug, info, trace, warn};

/// Default addressing context for `emit_op` keys.
pub const DEFAULT_SPEC: &str = "/Model!0.on";

static DEFAULT: LazyLock<Spec> =
    LazyLock::new(|| Spec::parse(DEFAULT_SPEC).expect("default spec is well formed"));

/// Returns the parsed [`DEFAULT_SPEC`].
pub fn default_spec() -> &'static Spec {
    &DEFAULT
}

/// Calls checked against the ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Handshake,
    PeerHandshake,
    EmitOp,
    Write,
    End,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Action::Handshake => "emit_handshake",
            Action::PeerHandshake => "write_handshake",
            Action::EmitOp => "emit_op",
            Action::Write => "write",
            Action::End => "end",
        }
    }
}

/// The protocol endpoint of one peer connection.
///
/// An `OpSource` holds the two handshake slots of a connection (ours and
/// the peer's), tracks the [`EndpointState`], turns raw input into
/// [`Op`] records published as [`OpSourceEvent`]s, and forwards outbound
/// records to its [`OpTransport`].
///
/// Listeners run synchronously inside the emitting call and cannot call
/// back into the endpoint; use [`OpSource::subscribe`] to react outside
/// the call.
pub struct OpSource<T: OpTransport = NullTransport> {
    config: OpSourceConfig,
    transport: T,
    state: EndpointState,
    hs: Option<Op>,
    peer_hs: Option<Op>,
    events: EventHub,
}

impl OpSource<NullTransport> {
    /// Creates an endpoint whose outbound direction goes nowhere.
    pub fn detached(config: OpSourceConfig) -> Self {
        Self::new(config, NullTransport)
    }
}

impl<T: OpTransport> OpSource<T> {
    /// Creates a new endpoint.
    pub fn new(config: OpSourceConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            state: EndpointState::Init,
            hs: None,
            peer_hs: None,
            events: EventHub::default(),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &OpSourceConfig {
        &self.config
    }

    /// Gets the current state.
    pub fn state(&self) -> EndpointState {
        self.state
    }

    /// Gets our handshake, once set.
    pub fn handshake(&self) -> Option<&Op> {
        self.hs.as_ref()
    }

    /// Gets the peer's handshake, once set.
    pub fn peer_handshake(&self) -> Option<&Op> {
        self.peer_hs.as_ref()
    }

    /// Gets the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the endpoint, returning its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Returns the stamp records built here are attributed to.
    ///
    /// This is our handshake stamp, or `"0"` before the handshake.
    pub fn source(&self) -> &str {
        self.hs.as_ref().map_or(NO_SOURCE, Op::source)
    }

    /// Renders `"<ours><dir><peer>"` for log lines.
    pub fn label(&self, inbound: bool) -> String {
        diagnostics::label(
            self.hs.as_ref().and_then(Op::stamp),
            inbound,
            self.peer_hs.as_ref().and_then(Op::stamp),
        )
    }

    /// Registers a callback for one event kind.
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&OpSourceEvent) + Send + 'static,
    {
        self.events.on(Some(kind), Box::new(listener));
    }

    /// Registers a callback for every event.
    pub fn on_any<F>(&mut self, listener: F)
    where
        F: FnMut(&OpSourceEvent) + Send + 'static,
    {
        self.events.on(None, Box::new(listener));
    }

    /// Opens a channel receiving every future event.
    ///
    /// The receiver can be drained without a runtime through `try_recv`.
    pub fn subscribe(&mut self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Sets our handshake and publishes it.
    ///
    /// The record's source is the stamp embedded in `addr`.
    ///
    /// # Errors
    ///
    /// Fails with [`SourceError::HandshakeRepeat`] if our handshake is
    /// already set.
    pub fn emit_handshake(
        &mut self,
        addr: &str,
        value: impl Into<Value>,
        patch: Option<Vec<Op>>,
    ) -> SourceResult<()> {
        let spec = Spec::parse(addr)?;
        self.accept_handshake(spec, value.into(), patch)
    }

    fn accept_handshake(
        &mut self,
        spec: Spec,
        value: Value,
        patch: Option<Vec<Op>>,
    ) -> SourceResult<()> {
        if self.hs.is_some() {
            warn!(endpoint = %self.config.name, spec = %spec, "handshake repeat");
            return Err(SourceError::HandshakeRepeat { side: Side::Local });
        }
        self.guard(Action::Handshake)?;
        self.check_handshake_spec(&spec)?;

        let source = spec.stamp().unwrap_or(NO_SOURCE).to_string();
        let hs = Op::from_parts(spec, value, source, patch);
        self.hs = Some(hs.clone());
        self.transition(self.state.on_local_handshake());

        self.log(Some(&hs), false, Some(Tag::Handshake));
        self.events.emit(OpSourceEvent::Handshake(hs));
        Ok(())
    }

    /// Builds an operation and publishes it.
    ///
    /// `key` is resolved against [`DEFAULT_SPEC`]. Each patch entry is
    /// resolved with the primary address's type and id as scope. Every
    /// record built is attributed to [`OpSource::source`].
    ///
    /// # Errors
    ///
    /// Fails on a malformed address, or under the strict policy when our
    /// handshake is missing or the stream is closed.
    pub fn emit_op(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        patch: Option<Patch>,
    ) -> SourceResult<()> {
        self.guard(Action::EmitOp)?;

        let source = self.source().to_string();
        let spec = Spec::resolve(key, None, default_spec())?;
        let patch = patch
            .map(|patch| {
                let scope = spec.type_id();
                patch
                    .into_iter()
                    .map(|kv| {
                        let sub = Spec::resolve(&kv.key, Some(&scope), default_spec())?;
                        Ok(Op::new(sub, kv.value, source.clone()))
                    })
                    .collect::<SourceResult<Vec<_>>>()
            })
            .transpose()?;

        let op = Op::from_parts(spec, value.into(), source, patch);
        self.log(Some(&op), false, None);
        self.events.emit(OpSourceEvent::Op(op));
        Ok(())
    }

    /// Like [`OpSource::emit_op`], with an untyped patch.
    ///
    /// # Errors
    ///
    /// Fails with [`SourceError::InvalidPatch`] unless `patch` is an
    /// array of `{key, value}` maps.
    pub fn emit_op_value(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        patch: Option<&Value>,
    ) -> SourceResult<()> {
        let patch = patch.map(Patch::try_from).transpose()?;
        self.emit_op(key, value, patch)
    }

    /// Publishes end of stream.
    ///
    /// # Errors
    ///
    /// Under the strict policy, fails once the stream is closed.
    pub fn emit_end(&mut self) -> SourceResult<()> {
        self.end(None)
    }

    fn end(&mut self, closing: Option<&Op>) -> SourceResult<()> {
        self.guard(Action::End)?;
        self.transition(self.state.on_end());
        self.log(closing, false, Some(Tag::End));
        self.events.emit(OpSourceEvent::End);
        Ok(())
    }

    /// Builds an error record and publishes it.
    ///
    /// Error signals are accepted in every state.
    ///
    /// # Errors
    ///
    /// Fails only if an explicit address is malformed.
    pub fn emit_error(&mut self, payload: impl Into<ErrorPayload>) -> SourceResult<()> {
        let op = self.error_record(payload.into(), true)?;
        self.transition(self.state.on_error());
        self.log(Some(&op), false, Some(Tag::Error));
        self.events.emit(OpSourceEvent::Error(op));
        Ok(())
    }

    /// Forwards an operation to the transport.
    ///
    /// # Errors
    ///
    /// Under the strict policy, fails before the peer's handshake or once
    /// the stream is closed.
    pub fn write(&mut self, op: &Op, callback: Option<Callback>) -> SourceResult<()> {
        self.guard(Action::Write)?;
        self.log(Some(op), true, None);
        self.transport.send_operation(op, callback);
        Ok(())
    }

    /// Alias of [`OpSource::write`].
    pub fn write_op(&mut self, op: &Op, callback: Option<Callback>) -> SourceResult<()> {
        self.write(op, callback)
    }

    /// Sets the peer's handshake and forwards it to the transport.
    ///
    /// # Errors
    ///
    /// Fails with [`SourceError::HandshakeRepeat`] if the peer's
    /// handshake is already set.
    pub fn write_handshake(&mut self, hs: Op, callback: Option<Callback>) -> SourceResult<()> {
        if self.peer_hs.is_some() {
            warn!(endpoint = %self.config.name, spec = %hs.spec(), "handshake repeat by the peer");
            return Err(SourceError::HandshakeRepeat { side: Side::Peer });
        }
        self.guard(Action::PeerHandshake)?;
        self.check_handshake_spec(hs.spec())?;

        self.peer_hs = Some(hs.clone());
        self.transition(self.state.on_peer_handshake());
        self.log(Some(&hs), true, Some(Tag::Handshake));
        self.transport.send_handshake(&hs, callback);
        Ok(())
    }

    /// Signals end of stream to the transport.
    ///
    /// # Errors
    ///
    /// Under the strict policy, fails once the stream is closed.
    pub fn write_end(&mut self, op: Option<&Op>, callback: Option<Callback>) -> SourceResult<()> {
        self.guard(Action::End)?;
        self.transition(self.state.on_end());
        self.log(op, true, Some(Tag::End));
        self.transport.send_end(op, callback);
        Ok(())
    }

    /// Forwards an error signal to the transport as an ordinary operation.
    ///
    /// Anything but a record is wrapped into an `.error` record first.
    /// A message's explicit address is dropped, since the peer only
    /// recognizes error signals addressed `.error`.
    pub fn write_error(
        &mut self,
        payload: impl Into<ErrorPayload>,
        callback: Option<Callback>,
    ) -> SourceResult<()> {
        let op = self.error_record(payload.into(), false)?;
        self.transition(self.state.on_error());
        self.log(Some(&op), true, Some(Tag::Error));
        self.transport.send_operation(&op, callback);
        Ok(())
    }

    /// Feeds a frame received from the peer into the emit side.
    ///
    /// Handshake frames set our handshake, `.error` records become error
    /// events, other records are published unchanged, and end frames end
    /// the stream. The record an end frame may carry is not published; it
    /// shows up in the `END` diagnostic line only.
    ///
    /// # Errors
    ///
    /// Propagates the errors of the emit call the frame maps to.
    pub fn deliver(&mut self, frame: Frame) -> SourceResult<()> {
        trace!(endpoint = %self.config.name, kind = frame.kind(), "deliver frame");
        match frame {
            Frame::Handshake(op) => {
                let (spec, value, _, patch) = op.into_parts();
                self.accept_handshake(spec, value, patch)
            }
            Frame::Op(op) if op.is_error() => self.emit_error(op),
            Frame::Op(op) => {
                self.guard(Action::EmitOp)?;
                self.log(Some(&op), false, None);
                self.events.emit(OpSourceEvent::Op(op));
                Ok(())
            }
            Frame::End(closing) => self.end(closing.as_ref()),
        }
    }

    fn error_record(&self, payload: ErrorPayload, keep_address: bool) -> SourceResult<Op> {
        match payload {
            ErrorPayload::Record(op) => Ok(op),
            ErrorPayload::Message { spec, message } => {
                let addr = spec
                    .as_deref()
                    .filter(|_| keep_address)
                    .unwrap_or(ERROR_SPEC);
                Ok(Op::new(Spec::parse(addr)?, message, self.source()))
            }
        }
    }

    fn check_handshake_spec(&self, spec: &Spec) -> SourceResult<()> {
        if self.config.is_strict() && !spec.is_handshake() {
            warn!(endpoint = %self.config.name, spec = %spec, "not a handshake address");
            return Err(SourceError::NotHandshake {
                spec: spec.to_string(),
            });
        }
        Ok(())
    }

    /// Applies the strict ordering policy.
    fn guard(&self, action: Action) -> SourceResult<()> {
        if !self.config.is_strict() {
            return Ok(());
        }
        let rejected = if self.state.is_terminal() {
            Some(SourceError::Closed {
                state: self.state,
                action: action.as_str(),
            })
        } else {
            let missing = match action {
                Action::EmitOp => self.hs.is_none(),
                Action::Write => self.peer_hs.is_none(),
                _ => false,
            };
            missing.then(|| SourceError::OutOfOrder {
                state: self.state,
                action: action.as_str(),
            })
        };
        match rejected {
            Some(err) => {
                warn!(endpoint = %self.config.name, error = %err, "call rejected");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn transition(&mut self, next: EndpointState) {
        if next != self.state {
            debug!(
                endpoint = %self.config.name,
                from = %self.state,
                to = %next,
                "state transition"
            );
            self.state = next;
        }
    }

    fn log(&self, op: Option<&Op>, inbound: bool, tag: Option<Tag>) {
        if !self.config.debug {
            return;
        }
        let line = diagnostics::diagnostic_line(&self.label(inbound), tag, op);
        info!(target: LOG_TARGET, endpoint = %self.config.name, "{line}");
    }
}

impl<T: OpTransport> fmt::Debug for OpSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpSource")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("hs", &self.hs.as_ref().map(|op| op.spec().to_string()))
            .field("peer_hs", &self.peer_hs.as_ref().map(|op| op.spec().to_string()))
            .field("listeners", &self.events.listener_count())
            .finish()
    }
}
