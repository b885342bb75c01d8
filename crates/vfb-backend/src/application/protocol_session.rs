//! ProtocolSession: per-connection handshake and event streaming state machine.
//!
//! # Lifecycle
//!
//! ```text
//!   AwaitingHandshake ──"ClientHello"──▶ Streaming ──peer closes / error──▶ Closed
//!          │                                                                  ▲
//!          └──────────────────── anything else ─────────────────────────────┘
//! ```
//!
//! The session is synchronous and never touches the socket: the I/O driver
//! (`infrastructure::network::session`) reads exactly one frame, hands the
//! payload to [`ProtocolSession::handle_frame`], and acts on the returned
//! [`FrameOutcome`].  That keeps every protocol rule testable with plain
//! byte slices.

use tracing::{debug, warn};
use vfb_core::protocol::{
    codec::decode_event,
    events::{CLIENT_HELLO, SERVER_HELLO},
    ConnectionId,
};

use crate::application::inject_input::{InjectInputUseCase, Injection};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingHandshake,
    Streaming,
    Closed,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The first payload was not `ClientHello`.
    HandshakeRejected,
    /// A frame arrived after the session had already closed.
    AlreadyClosed,
}

/// What the I/O driver must do after a frame was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Write this payload back as one frame.
    Reply(Vec<u8>),
    /// The event reached the input sink.
    Delivered,
    /// The frame was logged and dropped; keep reading.
    Skipped,
    /// Stop reading and close the connection without replying.
    Close(CloseReason),
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_received: u64,
    pub events_delivered: u64,
    pub events_skipped: u64,
}

/// One connection's protocol state.
pub struct ProtocolSession {
    id: ConnectionId,
    state: SessionState,
    injector: InjectInputUseCase,
    stats: SessionStats,
}

impl ProtocolSession {
    pub fn new(id: ConnectionId, injector: InjectInputUseCase) -> Self {
        Self {
            id,
            state: SessionState::AwaitingHandshake,
            injector,
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Handles one complete frame payload.
    pub fn handle_frame(&mut self, payload: &[u8]) -> FrameOutcome {
        match self.state {
            SessionState::AwaitingHandshake => self.handle_handshake(payload),
            SessionState::Streaming => {
                self.stats.frames_received += 1;
                self.handle_event(payload)
            }
            SessionState::Closed => FrameOutcome::Close(CloseReason::AlreadyClosed),
        }
    }

    /// Marks the session closed (transport error, EOF, shutdown).
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            debug!(conn = %self.id, "session closed");
            self.state = SessionState::Closed;
        }
    }

    fn handle_handshake(&mut self, payload: &[u8]) -> FrameOutcome {
        self.stats.frames_received += 1;
        if payload == CLIENT_HELLO {
            debug!(conn = %self.id, "handshake accepted");
            self.state = SessionState::Streaming;
            FrameOutcome::Reply(SERVER_HELLO.to_vec())
        } else {
            warn!(
                conn = %self.id,
                len = payload.len(),
                "handshake rejected: first frame is not ClientHello"
            );
            self.state = SessionState::Closed;
            FrameOutcome::Close(CloseReason::HandshakeRejected)
        }
    }

    fn handle_event(&mut self, payload: &[u8]) -> FrameOutcome {
        let event = match decode_event(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(conn = %self.id, "skipping malformed event: {e}");
                self.stats.events_skipped += 1;
                return FrameOutcome::Skipped;
            }
        };

        match self.injector.handle_event(&event) {
            Ok(Injection::Delivered) => {
                self.stats.events_delivered += 1;
                FrameOutcome::Delivered
            }
            Ok(Injection::Ignored { event_type }) => {
                warn!(conn = %self.id, "skipping unknown event type 0x{event_type:02X}");
                self.stats.events_skipped += 1;
                FrameOutcome::Skipped
            }
            Err(e) => {
                warn!(conn = %self.id, "input sink rejected event: {e}");
                self.stats.events_skipped += 1;
                FrameOutcome::Skipped
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::input_sink::mock::{RecordingInputSink, SinkCall};
    use vfb_core::protocol::{
        codec::encode_event,
        events::{InputEvent, KeyAction, KeyEvent, PointerMoveEvent},
    };

    fn make_session() -> (ProtocolSession, Arc<RecordingInputSink>) {
        let sink = Arc::new(RecordingInputSink::new());
        let injector = InjectInputUseCase::new(Arc::clone(&sink) as _);
        (ProtocolSession::new(ConnectionId(1), injector), sink)
    }

    fn motion(x: f64, y: f64) -> Vec<u8> {
        encode_event(&InputEvent::PointerMove(PointerMoveEvent {
            timestamp: 42,
            x,
            y,
        }))
        .unwrap()
    }

    #[test]
    fn test_new_session_awaits_handshake() {
        let (session, _) = make_session();
        assert_eq!(session.state(), SessionState::AwaitingHandshake);
        assert_eq!(session.id(), ConnectionId(1));
    }

    #[test]
    fn test_client_hello_is_answered_with_server_hello() {
        // Arrange
        let (mut session, _) = make_session();

        // Act
        let outcome = session.handle_frame(b"ClientHello");

        // Assert
        assert_eq!(outcome, FrameOutcome::Reply(b"ServerHello".to_vec()));
        assert_eq!(session.state(), SessionState::Streaming);
    }

    #[test]
    fn test_any_other_first_payload_closes_without_reply() {
        for payload in [&b"ClientHell"[..], b"clienthello", b"ClientHello\0", b""] {
            let (mut session, sink) = make_session();

            let outcome = session.handle_frame(payload);

            assert_eq!(outcome, FrameOutcome::Close(CloseReason::HandshakeRejected));
            assert_eq!(session.state(), SessionState::Closed);
            assert!(sink.calls().is_empty());
        }
    }

    #[test]
    fn test_event_before_handshake_is_not_delivered() {
        let (mut session, sink) = make_session();

        let outcome = session.handle_frame(&motion(1.0, 2.0));

        assert_eq!(outcome, FrameOutcome::Close(CloseReason::HandshakeRejected));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_events_are_delivered_in_arrival_order() {
        // Arrange
        let (mut session, sink) = make_session();
        session.handle_frame(b"ClientHello");

        // Act
        assert_eq!(session.handle_frame(&motion(1.0, 1.0)), FrameOutcome::Delivered);
        assert_eq!(session.handle_frame(&motion(2.0, 2.0)), FrameOutcome::Delivered);

        // Assert
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::MotionAbsolute { time: 42, x: 1.0, y: 1.0 },
                SinkCall::MotionAbsolute { time: 42, x: 2.0, y: 2.0 },
            ]
        );
        assert_eq!(session.stats().events_delivered, 2);
        assert_eq!(session.stats().frames_received, 3);
    }

    #[test]
    fn test_unknown_event_is_skipped_and_session_continues() {
        // Arrange
        let (mut session, sink) = make_session();
        session.handle_frame(b"ClientHello");

        // Act
        let skipped = session.handle_frame(&[0x99, 0, 0, 0, 0, 0, 0, 0, 0]);
        let delivered = session.handle_frame(&motion(5.0, 6.0));

        // Assert
        assert_eq!(skipped, FrameOutcome::Skipped);
        assert_eq!(delivered, FrameOutcome::Delivered);
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(session.stats().events_skipped, 1);
    }

    #[test]
    fn test_malformed_event_is_skipped() {
        let (mut session, sink) = make_session();
        session.handle_frame(b"ClientHello");

        let outcome = session.handle_frame(&[0x02, 0, 0]);

        assert_eq!(outcome, FrameOutcome::Skipped);
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_repeated_client_hello_while_streaming_is_skipped() {
        let (mut session, _) = make_session();
        session.handle_frame(b"ClientHello");

        let outcome = session.handle_frame(b"ClientHello");

        assert_eq!(outcome, FrameOutcome::Skipped);
        assert_eq!(session.state(), SessionState::Streaming);
    }

    #[test]
    fn test_sink_failure_skips_event_but_keeps_streaming() {
        // Arrange
        let sink = Arc::new(RecordingInputSink {
            should_fail: true,
            ..Default::default()
        });
        let mut session =
            ProtocolSession::new(ConnectionId(9), InjectInputUseCase::new(sink));
        session.handle_frame(b"ClientHello");
        let key = encode_event(&InputEvent::Key(KeyEvent {
            timestamp: 0,
            key_code: 30,
            action: KeyAction::Down,
        }))
        .unwrap();

        // Act
        let outcome = session.handle_frame(&key);

        // Assert
        assert_eq!(outcome, FrameOutcome::Skipped);
        assert_eq!(session.state(), SessionState::Streaming);
    }

    #[test]
    fn test_closed_session_refuses_further_frames() {
        let (mut session, sink) = make_session();
        session.handle_frame(b"ClientHello");
        session.close();

        let outcome = session.handle_frame(&motion(0.0, 0.0));

        assert_eq!(outcome, FrameOutcome::Close(CloseReason::AlreadyClosed));
        assert!(sink.calls().is_empty());
    }
}
