//! Local-socket input injection server.
//!
//! Architecture:
//! - [`listener::InputListener`] owns the Unix stream socket and accepts one
//!   capture client at a time.
//! - [`session::run_session`] drives one connection: it reads
//!   length-prefixed frames and hands each payload to a
//!   `ProtocolSession`, writing back whatever reply the session produces.
//! - [`client::InputClient`] is the other end of the socket, used by the
//!   `vfb-inject` tool and by integration tests.
//!
//! Frames are a 4-byte big-endian length followed by that many payload bytes.
//! The async helpers below are the only code that reads or writes them on a
//! stream.

pub mod client;
pub mod listener;
pub mod session;

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use vfb_core::protocol::frame::{encode_frame, read_frame_length, FrameError, LENGTH_PREFIX_SIZE};

/// Errors raised while setting up or running the listener.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("socket {operation} failed on {path}: {source}")]
    Socket {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// Errors raised while reading one frame from a stream.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The stream ended inside a length prefix or a payload.
    #[error("stream ended mid-frame")]
    Truncated,
    #[error("framing error: {0}")]
    Framing(#[from] FrameError),
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// Reads one frame payload.
///
/// Returns `Ok(None)` if the peer closed the stream cleanly at a frame
/// boundary.  A declared length above `max_len` is rejected before any
/// payload byte is read or allocated.
pub async fn read_frame<S>(stream: &mut S, max_len: usize) -> Result<Option<Vec<u8>>, SessionError>
where
    S: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let first = stream.read(&mut prefix).await?;
    if first == 0 {
        return Ok(None);
    }
    read_exact_or_truncated(stream, &mut prefix[first..]).await?;

    let len = read_frame_length(prefix, max_len)?;
    let mut payload = vec![0u8; len];
    read_exact_or_truncated(stream, &mut payload).await?;
    Ok(Some(payload))
}

/// Writes `payload` as one frame and flushes.
pub async fn write_frame<S>(stream: &mut S, payload: &[u8]) -> Result<(), SessionError>
where
    S: AsyncWrite + Unpin,
{
    let frame = encode_frame(payload)?;
    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}

async fn read_exact_or_truncated<S>(stream: &mut S, buf: &mut [u8]) -> Result<(), SessionError>
where
    S: AsyncRead + Unpin,
{
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(SessionError::Truncated),
        Err(e) => Err(SessionError::Io(e)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
