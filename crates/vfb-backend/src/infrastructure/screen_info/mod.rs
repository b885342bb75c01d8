//! Screen descriptor sources for the image output.
//!
//! A virtual output has no EDID to read, so its mode comes from
//! configuration.  [`ConfiguredScreen`] holds the configured descriptor and
//! lets the operator change the resolution at runtime with
//! [`ConfiguredScreen::set_size`]; the change takes effect the next time
//! the output is re-enabled, which rebuilds the framebuffer at the new size.
//!
//! A [`MockScreenSource`] is always compiled (not guarded by `#[cfg(test)]`)
//! so integration tests can script descriptor changes and count queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::info;
use vfb_core::domain::screen::{ScreenDescriptor, ScreenError};

use crate::application::output_lifecycle::{OutputError, ScreenDescriptorSource};

// ── Configured source ─────────────────────────────────────────────────────────

/// Descriptor source backed by the `[output]` configuration section.
pub struct ConfiguredScreen {
    descriptor: Mutex<ScreenDescriptor>,
}

impl ConfiguredScreen {
    pub fn new(descriptor: ScreenDescriptor) -> Self {
        Self {
            descriptor: Mutex::new(descriptor),
        }
    }

    /// Changes the resolution reported by later queries.
    ///
    /// The physical size follows the resolution, as it does for the default
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::InvalidSize`] if either dimension is below 1;
    /// the current descriptor is left unchanged.
    pub fn set_size(&self, width: u32, height: u32) -> Result<(), ScreenError> {
        if width < 1 || height < 1 {
            return Err(ScreenError::InvalidSize { width, height });
        }
        let mut descriptor = self.descriptor.lock().unwrap_or_else(PoisonError::into_inner);
        descriptor.width = width;
        descriptor.height = height;
        descriptor.width_mm = width;
        descriptor.height_mm = height;
        info!("screen size set to {width}x{height}; applies on next re-enable");
        Ok(())
    }

    pub fn current(&self) -> ScreenDescriptor {
        self.descriptor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScreenDescriptorSource for ConfiguredScreen {
    fn query(&self) -> Result<ScreenDescriptor, OutputError> {
        Ok(self.current())
    }
}

// ── Mock implementation (always compiled for tests) ───────────────────────────

/// A scriptable descriptor source.
///
/// Returns whatever was last passed to [`set`](Self::set), counts queries,
/// and fails every query while `should_fail` is set.
#[derive(Default)]
pub struct MockScreenSource {
    descriptor: Mutex<ScreenDescriptor>,
    queries: AtomicUsize,
    /// When `true`, `query` returns `OutputError::DescriptorQuery`.
    pub should_fail: bool,
}

impl MockScreenSource {
    pub fn new(descriptor: ScreenDescriptor) -> Self {
        Self {
            descriptor: Mutex::new(descriptor),
            ..Default::default()
        }
    }

    /// Replaces the descriptor returned by later queries.
    pub fn set(&self, descriptor: ScreenDescriptor) {
        *self.descriptor.lock().unwrap_or_else(PoisonError::into_inner) = descriptor;
    }

    /// Number of `query` calls so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl ScreenDescriptorSource for MockScreenSource {
    fn query(&self) -> Result<ScreenDescriptor, OutputError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(OutputError::DescriptorQuery("mock failure".into()));
        }
        Ok(self
            .descriptor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
