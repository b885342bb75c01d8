//! End-to-end tests for the injection socket: a real listener on a
//! temporary path, real clients, and a recording sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use vfb_backend::application::inject_input::InputSink;
use vfb_backend::infrastructure::input_sink::mock::{RecordingInputSink, SinkCall};
use vfb_backend::infrastructure::network::{
    client::InputClient,
    listener::InputListener,
    read_frame, write_frame,
    session::{SessionEnd, SessionSummary},
};
use vfb_backend::infrastructure::storage::config::InputConfig;
use vfb_core::protocol::events::{InputEvent, PointerMoveEvent};
use vfb_core::protocol::frame::DEFAULT_MAX_FRAME_LEN;

struct Harness {
    _dir: tempfile::TempDir,
    config: InputConfig,
    sink: Arc<RecordingInputSink>,
    reports: mpsc::UnboundedReceiver<SessionSummary>,
    server: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = InputConfig {
            socket_path: dir.path().join("input.sock"),
            ..Default::default()
        };
        let sink = Arc::new(RecordingInputSink::new());
        let mut listener = InputListener::bind(&config).unwrap();
        let reports = listener.session_reports();
        let server_sink = Arc::clone(&sink) as Arc<dyn InputSink>;
        let server = tokio::spawn(async move { listener.run(server_sink).await });
        Self {
            _dir: dir,
            config,
            sink,
            reports,
            server,
        }
    }

    async fn next_report(&mut self) -> SessionSummary {
        tokio::time::timeout(Duration::from_secs(5), self.reports.recv())
            .await
            .expect("session did not end in time")
            .expect("listener stopped")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn motion(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove(PointerMoveEvent {
        timestamp: 1_000,
        x,
        y,
    })
}

#[tokio::test]
async fn test_happy_path_motion_reaches_sink() {
    // Arrange
    let mut harness = Harness::start();

    // Act
    let mut client = InputClient::connect(&harness.config.socket_path).await.unwrap();
    client.send_event(&motion(100.0, 200.0)).await.unwrap();
    drop(client);
    let report = harness.next_report().await;

    // Assert
    assert_eq!(report.end, SessionEnd::PeerClosed);
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::MotionAbsolute { time: 1_000, x: 100.0, y: 200.0 }]
    );
}

#[tokio::test]
async fn test_truncated_frame_ends_session_without_delivery() {
    // Arrange
    let mut harness = Harness::start();
    let client = InputClient::connect(&harness.config.socket_path).await.unwrap();
    let mut stream = client.into_stream();

    // Act – declare a 25-byte motion event, send only its first 5 bytes
    stream.write_all(&[0, 0, 0, 25, 0x02, 0, 0, 0, 0]).await.unwrap();
    drop(stream);
    let report = harness.next_report().await;

    // Assert
    assert_eq!(report.end, SessionEnd::Truncated);
    assert!(harness.sink.calls().is_empty());
}

#[tokio::test]
async fn test_second_connection_is_refused_while_first_is_active() {
    // Arrange
    let mut harness = Harness::start();
    let mut first = InputClient::connect(&harness.config.socket_path).await.unwrap();

    // Act
    let second = InputClient::connect(&harness.config.socket_path).await;
    first.send_event(&motion(1.0, 1.0)).await.unwrap();
    drop(first);
    let report = harness.next_report().await;

    // Assert
    assert!(second.is_err(), "second client must not complete the handshake");
    assert_eq!(report.stats.events_delivered, 1);
    assert_eq!(harness.sink.calls().len(), 1);
}

#[tokio::test]
async fn test_next_client_is_served_after_first_disconnects() {
    let mut harness = Harness::start();
    let first = InputClient::connect(&harness.config.socket_path).await.unwrap();
    drop(first);
    harness.next_report().await;

    let mut second = InputClient::connect(&harness.config.socket_path).await.unwrap();
    second.send_event(&motion(3.0, 4.0)).await.unwrap();
    drop(second);
    let report = harness.next_report().await;

    assert_eq!(report.end, SessionEnd::PeerClosed);
    assert_eq!(harness.sink.calls().len(), 1);
}

#[tokio::test]
async fn test_unknown_event_tag_is_skipped_and_stream_continues() {
    // Arrange
    let mut harness = Harness::start();
    let mut client = InputClient::connect(&harness.config.socket_path).await.unwrap();

    // Act
    client.send_raw(&[0x55, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3]).await.unwrap();
    client.send_event(&motion(5.0, 6.0)).await.unwrap();
    drop(client);
    let report = harness.next_report().await;

    // Assert
    assert_eq!(report.stats.events_skipped, 1);
    assert_eq!(report.stats.events_delivered, 1);
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::MotionAbsolute { time: 1_000, x: 5.0, y: 6.0 }]
    );
}

#[tokio::test]
async fn test_wrong_handshake_is_closed_without_reply() {
    // Arrange
    let mut harness = Harness::start();
    let mut stream = UnixStream::connect(&harness.config.socket_path).await.unwrap();

    // Act
    write_frame(&mut stream, b"HelloServer").await.unwrap();
    let reply = read_frame(&mut stream, DEFAULT_MAX_FRAME_LEN).await;
    let report = harness.next_report().await;

    // Assert
    assert!(matches!(reply, Ok(None)), "server must close without replying");
    assert_eq!(report.end, SessionEnd::HandshakeRejected);
}
