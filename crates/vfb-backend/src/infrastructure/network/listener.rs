//! The Unix stream socket capture clients connect to.
//!
//! # Binding
//!
//! The socket is created through `nix` rather than
//! `tokio::net::UnixListener::bind` so the listen backlog can be set
//! explicitly.  Before binding, a stale socket left by a previous run is
//! unlinked; any other kind of file at the path is left alone and binding
//! fails.  After binding, the socket file gets the configured permission
//! bits so unprivileged capture clients can connect.  Dropping the listener
//! unlinks the socket file.
//!
//! # One client at a time
//!
//! A single-permit semaphore guards the session slot.  A connection that
//! arrives while a session is running is accepted, logged, and closed
//! immediately; the running session is not disturbed.

use std::fs::{self, Permissions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nix::sys::socket::{
    bind, listen, socket, AddressFamily, Backlog, SockFlag, SockType, UnixAddr,
};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};
use vfb_core::protocol::ConnectionCounter;

use crate::application::inject_input::{InjectInputUseCase, InputSink};
use crate::application::protocol_session::ProtocolSession;
use crate::infrastructure::network::session::{run_session, SessionSummary};
use crate::infrastructure::network::NetworkError;
use crate::infrastructure::storage::config::InputConfig;

/// Default socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/weston_socket";

/// Default permission bits of the socket file.
pub const DEFAULT_SOCKET_MODE: u32 = 0o666;

/// Listen backlog of the socket.
pub const LISTEN_BACKLOG: i32 = 4;

/// Accepts capture clients and runs one session at a time.
pub struct InputListener {
    path: PathBuf,
    max_frame_len: usize,
    listener: UnixListener,
    slot: Arc<Semaphore>,
    counter: ConnectionCounter,
    reports: Option<mpsc::UnboundedSender<SessionSummary>>,
}

impl InputListener {
    /// Binds and starts listening on `config.socket_path`.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Socket`] naming the step that failed.
    pub fn bind(config: &InputConfig) -> Result<Self, NetworkError> {
        let path = config.socket_path.clone();
        let fail = |operation: &'static str, source: io::Error| NetworkError::Socket {
            operation,
            path: path.clone(),
            source,
        };

        remove_stale_socket(&path).map_err(|e| fail("unlink", e))?;

        let fd = socket(
            AddressFamily::Unix,
            SockType::Stream,
            SockFlag::SOCK_CLOEXEC | SockFlag::SOCK_NONBLOCK,
            None,
        )
        .map_err(|e| fail("create", e.into()))?;
        let addr = UnixAddr::new(path.as_path()).map_err(|e| fail("address", e.into()))?;
        bind(fd.as_raw_fd(), &addr).map_err(|e| fail("bind", e.into()))?;
        let backlog = Backlog::new(LISTEN_BACKLOG).map_err(|e| fail("listen", e.into()))?;
        listen(&fd, backlog).map_err(|e| fail("listen", e.into()))?;
        fs::set_permissions(&path, Permissions::from_mode(config.socket_mode))
            .map_err(|e| fail("chmod", e))?;

        let listener = UnixListener::from_std(std::os::unix::net::UnixListener::from(fd))
            .map_err(|e| fail("register", e))?;

        info!(
            path = %path.display(),
            backlog = LISTEN_BACKLOG,
            "input socket listening, mode {:o}",
            config.socket_mode
        );
        Ok(Self {
            path,
            max_frame_len: config.max_frame_len,
            listener,
            slot: Arc::new(Semaphore::new(1)),
            counter: ConnectionCounter::new(),
            reports: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` while a session holds the slot.
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Delivers a [`SessionSummary`] for every session that ends from now on.
    pub fn session_reports(&mut self) -> mpsc::UnboundedReceiver<SessionSummary> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.reports = Some(tx);
        rx
    }

    /// Accepts connections forever, injecting into `sink`.
    ///
    /// Each session runs on its own task.  Accept errors are logged and the
    /// loop continues.
    pub async fn run(&self, sink: Arc<dyn InputSink>) {
        loop {
            let (mut stream, _) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("{}", NetworkError::Accept(e));
                    continue;
                }
            };
            let id = self.counter.next();

            let permit = match Arc::clone(&self.slot).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    warn!(conn = %id, "refusing connection: a client is already connected");
                    drop(stream);
                    continue;
                }
            };

            info!(conn = %id, "client connected");
            let session = ProtocolSession::new(id, InjectInputUseCase::new(Arc::clone(&sink)));
            let max_frame_len = self.max_frame_len;
            let reports = self.reports.clone();
            tokio::spawn(async move {
                let summary = run_session(&mut stream, session, max_frame_len).await;
                drop(stream);
                drop(permit);
                if let Some(tx) = reports {
                    let _ = tx.send(summary);
                }
            });
        }
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "socket file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "removing socket file failed: {e}"),
        }
    }
}

/// Unlinks a socket left at `path` by an earlier run.
fn remove_stale_socket(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            debug!(path = %path.display(), "removing stale socket");
            fs::remove_file(path)
        }
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists and is not a socket",
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
