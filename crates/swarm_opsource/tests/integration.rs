//! Integration tests piping two endpoints through an in-process transport.

use swarm_opsource::{
    channel_transport, ChannelTransport, EndpointState, ErrorPayload, EventKind, Frame,
    FrameReceiver, MemoryTransport, Op, OpSource, OpSourceConfig, OpSourceEvent, OrderingPolicy,
    SourceError, Spec, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("swarm=info,swarm_opsource=debug")
        .try_init();
}

/// Endpoint `a` writes toward the wire; endpoint `b` consumes what arrives.
struct Link {
    a: OpSource<ChannelTransport>,
    wire: FrameReceiver,
    b: OpSource<MemoryTransport>,
}

impl Link {
    fn new(policy: OrderingPolicy) -> Self {
        init_tracing();
        let (transport, wire) = channel_transport();
        let config = |name: &str| {
            OpSourceConfig::new(name)
                .with_debug(true)
                .with_policy(policy)
        };
        Self {
            a: OpSource::new(config("a"), transport),
            wire,
            b: OpSource::new(config("b"), MemoryTransport::new()),
        }
    }

    /// Moves every pending frame from the wire into `b`.
    fn pump(&mut self) -> Result<usize, SourceError> {
        let mut moved = 0;
        while let Ok(frame) = self.wire.try_recv() {
            self.b.deliver(frame)?;
            moved += 1;
        }
        Ok(moved)
    }
}

fn handshake(stamp: &str) -> Op {
    Op::new(
        Spec::parse(&format!("/Swarm#db!{stamp}.on")).unwrap(),
        "",
        stamp,
    )
}

fn set(id: &str, stamp: &str, value: i64) -> Op {
    Op::new(
        Spec::parse(&format!("/Model#{id}!{stamp}.set")).unwrap(),
        value,
        stamp,
    )
}

#[test]
fn handshake_ops_and_end_arrive_in_order() {
    let mut link = Link::new(OrderingPolicy::Strict);
    let mut events = link.b.subscribe();

    link.a.write_handshake(handshake("A"), None).unwrap();
    link.a.write(&set("m1", "A", 1), None).unwrap();
    link.a.write(&set("m1", "A", 2), None).unwrap();
    link.a.write_end(None, None).unwrap();

    assert_eq!(link.pump().unwrap(), 4);

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|event| event.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![EventKind::Handshake, EventKind::Op, EventKind::Op, EventKind::End]
    );
    assert_eq!(link.a.state(), EndpointState::Ended);
    assert_eq!(link.b.state(), EndpointState::Ended);
    assert_eq!(link.b.source(), "A");
}

#[test]
fn peer_ops_keep_their_source() {
    let mut link = Link::new(OrderingPolicy::Permissive);
    let mut events = link.b.subscribe();

    link.a.write_handshake(handshake("A"), None).unwrap();
    link.a.write(&set("m1", "X", 5), None).unwrap();
    link.pump().unwrap();

    events.try_recv().unwrap();
    let op = events.try_recv().unwrap().into_op().unwrap();
    assert_eq!(op.source(), "X");
    assert_eq!(op.value(), &Value::Integer(5));
}

#[test]
fn written_errors_surface_as_error_events() {
    let mut link = Link::new(OrderingPolicy::Strict);
    let mut events = link.b.subscribe();

    link.a.write_handshake(handshake("A"), None).unwrap();
    link.a.write_error("replica diverged", None).unwrap();
    link.pump().unwrap();

    assert_eq!(events.try_recv().unwrap().kind(), EventKind::Handshake);
    match events.try_recv().unwrap() {
        OpSourceEvent::Error(op) => {
            assert_eq!(op.spec().to_string(), ".error");
            assert_eq!(op.value(), &Value::from("replica diverged"));
        }
        other => panic!("expected error event, got {other:?}"),
    }
    assert_eq!(link.a.state(), EndpointState::Errored);
    assert_eq!(link.b.state(), EndpointState::Errored);
}

#[test]
fn addressed_error_messages_arrive_as_errors() {
    let mut link = Link::new(OrderingPolicy::Permissive);
    let mut events = link.b.subscribe();

    link.a
        .write_error(ErrorPayload::with_spec("/Model#m.fail", "bad input"), None)
        .unwrap();
    link.pump().unwrap();

    match events.try_recv().unwrap() {
        OpSourceEvent::Error(op) => {
            assert!(op.is_error());
            assert_eq!(op.value(), &Value::from("bad input"));
        }
        other => panic!("expected error event, got {other:?}"),
    }
    assert_eq!(link.b.state(), EndpointState::Errored);
}

#[test]
fn repeated_handshake_on_the_wire_is_rejected_by_the_receiver() {
    let mut link = Link::new(OrderingPolicy::Permissive);

    link.a.write_handshake(handshake("A"), None).unwrap();
    link.pump().unwrap();

    // The writer refuses a second handshake outright.
    assert!(link.a.write_handshake(handshake("A2"), None).is_err());

    // A misbehaving peer that sends one anyway is caught on delivery.
    let err = link
        .b
        .deliver(Frame::Handshake(handshake("A3")))
        .unwrap_err();
    assert!(err.is_protocol_violation());
    assert_eq!(link.b.handshake().unwrap().stamp(), Some("A"));
}

#[test]
fn consumer_replies_through_its_own_transport() {
    let mut link = Link::new(OrderingPolicy::Strict);

    link.a.write_handshake(handshake("A"), None).unwrap();
    link.pump().unwrap();

    link.b.write_handshake(handshake("B"), None).unwrap();
    link.b.write(&set("m2", "B", 9), None).unwrap();

    assert_eq!(link.b.label(true), "A<B");
    assert_eq!(link.b.state(), EndpointState::Established);
    assert_eq!(link.b.transport().len(), 2);
}
