//! Transport abstraction for the outbound direction.

use crate::error::{TransportError, TransportResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use swarm_protocol::{Frame, Op};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Completion callback handed to a transport primitive.
///
/// A transport may invoke it before returning or at any later point.
pub type Callback = Box<dyn FnOnce(TransportResult<()>) + Send>;

/// Invokes `callback`, if present, with `result`.
pub fn complete(callback: Option<Callback>, result: TransportResult<()>) {
    if let Some(callback) = callback {
        callback(result);
    }
}

/// The primitives a concrete transport provides.
///
/// Every method has a no-op default that completes immediately, so a
/// transport only implements what it actually carries. Failures are
/// reported through the callback, never returned.
pub trait OpTransport {
    /// Transmits one ordinary operation, including `.error` records.
    fn send_operation(&mut self, _op: &Op, callback: Option<Callback>) {
        complete(callback, Ok(()));
    }

    /// Transmits a handshake record.
    fn send_handshake(&mut self, _handshake: &Op, callback: Option<Callback>) {
        complete(callback, Ok(()));
    }

    /// Signals end of stream.
    fn send_end(&mut self, _op: Option<&Op>, callback: Option<Callback>) {
        complete(callback, Ok(()));
    }
}

/// A transport that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl OpTransport for NullTransport {}

/// A transport recording every frame in memory.
///
/// Clones share the same log, so a test can keep a handle while the
/// endpoint owns the transport.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    frames: Arc<Mutex<Vec<Frame>>>,
    connected: Arc<AtomicBool>,
}

impl MemoryTransport {
    /// Creates a new connected memory transport.
    pub fn new() -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns a copy of the recorded frames.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Removes and returns the recorded frames.
    pub fn take_frames(&self) -> Vec<Frame> {
        std::mem::take(&mut *self.frames.lock())
    }

    /// Returns the number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Sets the connected state.
    ///
    /// While disconnected, sends complete with
    /// [`TransportError::Disconnected`] and record nothing.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Checks if the transport is connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn record(&self, frame: Frame, callback: Option<Callback>) {
        if !self.is_connected() {
            complete(callback, Err(TransportError::Disconnected));
            return;
        }
        self.frames.lock().push(frame);
        complete(callback, Ok(()));
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl OpTransport for MemoryTransport {
    fn send_operation(&mut self, op: &Op, callback: Option<Callback>) {
        self.record(Frame::Op(op.clone()), callback);
    }

    fn send_handshake(&mut self, handshake: &Op, callback: Option<Callback>) {
        self.record(Frame::Handshake(handshake.clone()), callback);
    }

    fn send_end(&mut self, op: Option<&Op>, callback: Option<Callback>) {
        self.record(Frame::End(op.cloned()), callback);
    }
}

/// Receiving half of a [`ChannelTransport`].
pub type FrameReceiver = UnboundedReceiver<Frame>;

/// An in-process transport pushing frames into a channel.
///
/// Pair it with [`crate::OpSource::deliver`] on the receiving endpoint
/// to connect two endpoints without a wire.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: UnboundedSender<Frame>,
}

impl ChannelTransport {
    fn send(&self, frame: Frame, callback: Option<Callback>) {
        let result = self.tx.send(frame).map_err(|_| TransportError::Closed);
        complete(callback, result);
    }
}

/// Creates a channel transport and the receiver of its frames.
pub fn channel_transport() -> (ChannelTransport, FrameReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelTransport { tx }, rx)
}

impl OpTransport for ChannelTransport {
    fn send_operation(&mut self, op: &Op, callback: Option<Callback>) {
        self.send(Frame::Op(op.clone()), callback);
    }

    fn send_handshake(&mut self, handshake: &Op, callback: Option<Callback>) {
        self.send(Frame::Handshake(handshake.clone()), callback);
    }

    fn send_end(&mut self, op: Option<&Op>, callback: Option<Callback>) {
        self.send(Frame::End(op.cloned()), callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_spec::Spec;

    fn op() -> Op {
        Op::new(Spec::parse("/Model#m!A.set").unwrap(), 1i64, "A")
    }

    fn recorder() -> (Arc<Mutex<Vec<TransportResult<()>>>>, impl Fn() -> Option<Callback>) {
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let make = move || {
            let sink = Arc::clone(&sink);
            let callback: Callback = Box::new(move |result: TransportResult<()>| sink.lock().push(result));
            Some(callback)
        };
        (results, make)
    }

    #[test]
    fn null_transport_completes_immediately() {
        let (results, callback) = recorder();
        let mut transport = NullTransport;
        transport.send_operation(&op(), callback());
        transport.send_handshake(&op(), callback());
        transport.send_end(None, callback());
        transport.send_end(None, None);
        assert_eq!(*results.lock(), vec![Ok(()), Ok(()), Ok(())]);
    }

    #[test]
    fn memory_transport_records_frames() {
        let handle = MemoryTransport::new();
        let mut transport = handle.clone();
        transport.send_handshake(&op(), None);
        transport.send_operation(&op(), None);
        transport.send_end(None, None);

        assert_eq!(handle.len(), 3);
        let frames = handle.take_frames();
        assert_eq!(frames[0], Frame::Handshake(op()));
        assert_eq!(frames[1], Frame::Op(op()));
        assert_eq!(frames[2], Frame::End(None));
        assert!(handle.is_empty());
    }

    #[test]
    fn memory_transport_disconnected() {
        let (results, callback) = recorder();
        let mut transport = MemoryTransport::new();
        transport.set_connected(false);
        assert!(!transport.is_connected());

        transport.send_operation(&op(), callback());
        assert!(transport.is_empty());
        assert_eq!(*results.lock(), vec![Err(TransportError::Disconnected)]);
    }

    #[test]
    fn channel_transport_delivers_in_order() {
        let (mut transport, mut rx) = channel_transport();
        transport.send_handshake(&op(), None);
        transport.send_operation(&op(), None);

        assert_eq!(rx.try_recv().unwrap(), Frame::Handshake(op()));
        assert_eq!(rx.try_recv().unwrap(), Frame::Op(op()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_transport_reports_closed_receiver() {
        let (results, callback) = recorder();
        let (mut transport, rx) = channel_transport();
        drop(rx);
        transport.send_end(None, callback());
        assert_eq!(*results.lock(), vec![Err(TransportError::Closed)]);
    }
}
