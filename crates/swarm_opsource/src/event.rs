//! Endpoint events and their listeners.

use swarm_protocol::Op;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The kind of an endpoint event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A handshake record.
    Handshake,
    /// An operation record.
    Op,
    /// End of stream.
    End,
    /// An error record.
    Error,
}

/// An event published by an endpoint.
///
/// Only these four kinds exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpSourceEvent {
    /// Our handshake was set.
    Handshake(Op),
    /// An operation was emitted.
    Op(Op),
    /// No further data will arrive.
    End,
    /// An error was signalled.
    Error(Op),
}

impl OpSourceEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            OpSourceEvent::Handshake(_) => EventKind::Handshake,
            OpSourceEvent::Op(_) => EventKind::Op,
            OpSourceEvent::End => EventKind::End,
            OpSourceEvent::Error(_) => EventKind::Error,
        }
    }

    /// Returns the record carried by this event, if any.
    pub fn op(&self) -> Option<&Op> {
        match self {
            OpSourceEvent::Handshake(op) | OpSourceEvent::Op(op) | OpSourceEvent::Error(op) => {
                Some(op)
            }
            OpSourceEvent::End => None,
        }
    }

    /// Consumes the event, returning its record.
    pub fn into_op(self) -> Option<Op> {
        match self {
            OpSourceEvent::Handshake(op) | OpSourceEvent::Op(op) | OpSourceEvent::Error(op) => {
                Some(op)
            }
            OpSourceEvent::End => None,
        }
    }
}

/// A callback listener.
pub type Listener = Box<dyn FnMut(&OpSourceEvent) + Send>;

/// Receiving half of an event subscription.
pub type EventReceiver = UnboundedReceiver<OpSourceEvent>;

/// Distributes events to callbacks and channel subscribers.
///
/// Callbacks run synchronously in registration order. Subscribers whose
/// receiver was dropped are removed on the next event.
#[derive(Default)]
pub(crate) struct EventHub {
    listeners: Vec<(Option<EventKind>, Listener)>,
    subscribers: Vec<UnboundedSender<OpSourceEvent>>,
}

impl EventHub {
    /// Registers a callback for one kind, or for all kinds with `None`.
    pub(crate) fn on(&mut self, kind: Option<EventKind>, listener: Listener) {
        self.listeners.push((kind, listener));
    }

    /// Opens a channel receiving every future event.
    pub(crate) fn subscribe(&mut self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: OpSourceEvent) {
        let kind = event.kind();
        for (filter, listener) in &mut self.listeners {
            if filter.map_or(true, |k| k == kind) {
                listener(&event);
            }
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len() + self.subscribers.len()
    }
}
