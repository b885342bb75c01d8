//! Per-connection I/O driver.
//!
//! Reads one frame at a time, passes the payload to a [`ProtocolSession`],
//! and acts on the [`FrameOutcome`].  Reads and replies happen on the same
//! task, so events are injected strictly in arrival order.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};
use vfb_core::protocol::{frame::FrameError, ConnectionId};

use crate::application::protocol_session::{
    CloseReason, FrameOutcome, ProtocolSession, SessionStats,
};
use crate::infrastructure::network::{read_frame, write_frame, SessionError};

/// Why a session's read loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the stream between frames.
    PeerClosed,
    /// The stream ended in the middle of a frame.
    Truncated,
    /// A length prefix exceeded the frame limit.
    Framing(FrameError),
    /// Reading or writing the socket failed.
    Transport(std::io::ErrorKind),
    /// The first frame was not `ClientHello`.
    HandshakeRejected,
    /// The session was already closed when a frame arrived.
    Closed,
}

/// What a finished session reports to the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: ConnectionId,
    pub end: SessionEnd,
    pub stats: SessionStats,
}

/// Runs `session` over `stream` until the connection ends.
pub async fn run_session<S>(
    stream: &mut S,
    mut session: ProtocolSession,
    max_frame_len: usize,
) -> SessionSummary
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let id = session.id();
    let end = drive(stream, &mut session, max_frame_len).await;
    session.close();

    let stats = session.stats();
    match &end {
        SessionEnd::PeerClosed => info!(
            conn = %id,
            delivered = stats.events_delivered,
            skipped = stats.events_skipped,
            "client disconnected"
        ),
        other => warn!(conn = %id, end = ?other, "session ended"),
    }
    SessionSummary { id, end, stats }
}

async fn drive<S>(stream: &mut S, session: &mut ProtocolSession, max_frame_len: usize) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let payload = match read_frame(stream, max_frame_len).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return SessionEnd::PeerClosed,
            Err(e) => return read_error_end(e),
        };

        match session.handle_frame(&payload) {
            FrameOutcome::Reply(reply) => {
                if let Err(e) = write_frame(stream, &reply).await {
                    return read_error_end(e);
                }
                debug!(conn = %session.id(), "handshake reply sent");
            }
            FrameOutcome::Delivered | FrameOutcome::Skipped => {}
            FrameOutcome::Close(CloseReason::HandshakeRejected) => {
                return SessionEnd::HandshakeRejected
            }
            FrameOutcome::Close(CloseReason::AlreadyClosed) => return SessionEnd::Closed,
        }
    }
}

fn read_error_end(error: SessionError) -> SessionEnd {
    match error {
        SessionError::Truncated => SessionEnd::Truncated,
        SessionError::Framing(e) => SessionEnd::Framing(e),
        SessionError::Io(e) => SessionEnd::Transport(e.kind()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
