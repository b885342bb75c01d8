//! FrameScheduler: the per-output repaint pacing timer.
//!
//! A virtual output has no vblank interrupt.  After each repaint the output
//! arms a single-shot timer for one refresh period; when it fires, the output
//! tells the host the frame is finished, and the host decides whether to
//! repaint again.  The timer never re-arms itself.
//!
//! The scheduler only stores a deadline.  The caller owns the clock: the
//! binary's event loop sleeps until [`FrameScheduler::deadline`] and then
//! calls [`FrameScheduler::poll`]; tests pass synthetic `Instant`s.

use std::time::{Duration, Instant};

/// Refresh period for `refresh_mhz`, truncated to whole milliseconds.
///
/// 60000 mHz gives 16 ms.  A zero rate (rejected by descriptor validation
/// before an output exists) maps to one second instead of dividing by zero.
pub fn refresh_interval(refresh_mhz: u32) -> Duration {
    if refresh_mhz == 0 {
        return Duration::from_secs(1);
    }
    Duration::from_millis(u64::from(1_000_000 / refresh_mhz))
}

/// Single-shot, re-armable frame timer.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    deadline: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(refresh_mhz: u32) -> Self {
        Self {
            interval: refresh_interval(refresh_mhz),
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the period used by the next [`arm`](Self::arm).
    ///
    /// An already armed deadline is left as it is.
    pub fn set_refresh(&mut self, refresh_mhz: u32) {
        self.interval = refresh_interval(refresh_mhz);
    }

    /// Arms the timer one period after `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the deadline has passed, then disarms.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
