//! Identifiers for accepted injection connections.
//!
//! Every connection the listener accepts, including ones it refuses because
//! a session is already active, gets the next [`ConnectionId`].  The id only
//! appears in log records; it lets an operator tell apart the lines of two
//! sessions that were served one after another.
//!
//! The counter uses `AtomicU64` so the accept loop and tests running on a
//! multi-threaded runtime can share one counter without a lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque per-connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Hands out monotonically increasing [`ConnectionId`]s, starting at 1.
///
/// # Examples
///
/// ```rust
/// use vfb_core::protocol::ConnectionCounter;
///
/// let counter = ConnectionCounter::new();
/// assert_eq!(counter.next().0, 1);
/// assert_eq!(counter.next().0, 2);
/// assert_eq!(counter.issued(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ConnectionCounter {
    issued: AtomicU64,
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next identifier.
    ///
    /// `Relaxed` is enough: ids only need to be unique, not to order other
    /// memory operations.
    pub fn next(&self) -> ConnectionId {
        ConnectionId(self.issued.fetch_add(1, Ordering::Relaxed).wrapping_add(1))
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}
