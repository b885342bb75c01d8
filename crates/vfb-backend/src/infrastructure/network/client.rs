//! Client side of the injection socket.

use std::path::Path;

use thiserror::Error;
use tokio::net::UnixStream;
use tracing::debug;
use vfb_core::protocol::{
    codec::{encode_event, ProtocolError},
    events::{InputEvent, CLIENT_HELLO, SERVER_HELLO},
    frame::DEFAULT_MAX_FRAME_LEN,
};

use crate::infrastructure::network::{read_frame, write_frame, SessionError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connecting to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Frame(#[from] SessionError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("server closed the connection during the handshake")]
    ClosedDuringHandshake,
    #[error("unexpected handshake reply ({0} bytes)")]
    UnexpectedReply(usize),
}

/// A connected, handshaken capture client.
pub struct InputClient {
    stream: UnixStream,
}

impl InputClient {
    /// Connects to `path` and performs the `ClientHello` / `ServerHello`
    /// exchange.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path)
            .await
            .map_err(|source| ClientError::Connect {
                path: path.display().to_string(),
                source,
            })?;
        let mut client = Self { stream };
        client.handshake().await?;
        Ok(client)
    }

    async fn handshake(&mut self) -> Result<(), ClientError> {
        write_frame(&mut self.stream, CLIENT_HELLO).await?;
        match read_frame(&mut self.stream, DEFAULT_MAX_FRAME_LEN).await? {
            Some(reply) if reply == SERVER_HELLO => {
                debug!("handshake complete");
                Ok(())
            }
            Some(reply) => Err(ClientError::UnexpectedReply(reply.len())),
            None => Err(ClientError::ClosedDuringHandshake),
        }
    }

    /// Encodes and sends one event.
    pub async fn send_event(&mut self, event: &InputEvent) -> Result<(), ClientError> {
        let payload = encode_event(event)?;
        self.send_raw(&payload).await
    }

    /// Sends an arbitrary payload as one frame.
    pub async fn send_raw(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        write_frame(&mut self.stream, payload).await?;
        Ok(())
    }

    pub fn into_stream(self) -> UnixStream {
        self.stream
    }
}
