//! A headless stand-in for the host compositor.
//!
//! The standalone binary has no compositor core above it, so this host owns
//! a monotonic presentation clock and simply counts finished frames.  An
//! embedding compositor supplies its own [`HostCompositor`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::application::output_lifecycle::{FrameFlags, HostCompositor};

pub struct HeadlessHost {
    epoch: Instant,
    frames: AtomicU64,
    removed: Mutex<Vec<String>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            frames: AtomicU64::new(0),
            removed: Mutex::new(Vec::new()),
        }
    }

    /// Frames reported finished with a valid presentation time.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Names of outputs the backend has removed.
    pub fn removed_outputs(&self) -> Vec<String> {
        self.removed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostCompositor for HeadlessHost {
    fn read_presentation_clock(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn finish_frame(&self, output: &str, presented_at: Duration, flags: FrameFlags) {
        if !flags.contains(FrameFlags::INVALID) {
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
        trace!(output, ?presented_at, flags = flags.bits(), "frame finished");
    }

    fn output_removed(&self, output: &str) {
        warn!(output, "output removed by backend");
        self.removed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(output.to_string());
    }
}
