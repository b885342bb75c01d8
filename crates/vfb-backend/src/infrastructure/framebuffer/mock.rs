//! In-memory framebuffer device for unit tests.
//!
//! Hands out plain `Vec<u8>` buffers instead of file mappings and records
//! every storage call in a shared [`DeviceLog`], so a test can keep the log
//! after the device has moved into an output.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vfb_core::domain::screen::SurfaceLayout;

use crate::application::output_lifecycle::{FramebufferDevice, OutputError};

/// Calls observed by a [`MockFramebufferDevice`].
#[derive(Debug, Default)]
pub struct DeviceLog {
    opened: Mutex<Vec<usize>>,
    maps: AtomicUsize,
    unmaps: AtomicUsize,
    closes: AtomicUsize,
}

impl DeviceLog {
    /// Lengths passed to every `open`, in call order.
    pub fn opened_lengths(&self) -> Vec<usize> {
        self.opened.lock().unwrap().clone()
    }

    pub fn maps(&self) -> usize {
        self.maps.load(Ordering::SeqCst)
    }

    pub fn unmaps(&self) -> usize {
        self.unmaps.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A device whose memory is a heap buffer.
pub struct MockFramebufferDevice {
    pub log: Arc<DeviceLog>,
    /// When `true`, `open` fails.
    pub fail_open: bool,
    /// When `true`, `map` fails.
    pub fail_map: bool,
    /// When `true`, `map` returns a buffer one byte shorter than the layout.
    pub short_map: bool,
}

impl MockFramebufferDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(DeviceLog::default()),
            fail_open: false,
            fail_map: false,
            short_map: false,
        }
    }

    pub fn log(&self) -> Arc<DeviceLog> {
        Arc::clone(&self.log)
    }
}

impl Default for MockFramebufferDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl FramebufferDevice for MockFramebufferDevice {
    type Memory = Vec<u8>;

    fn open(&mut self, layout: &SurfaceLayout) -> Result<(), OutputError> {
        if self.fail_open {
            return Err(OutputError::Storage {
                operation: "open",
                target: self.describe(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "mock failure"),
            });
        }
        self.log.opened.lock().unwrap().push(layout.length);
        Ok(())
    }

    fn map(&mut self, layout: &SurfaceLayout) -> Result<Vec<u8>, OutputError> {
        if self.fail_map {
            return Err(OutputError::Storage {
                operation: "map",
                target: self.describe(),
                source: io::Error::new(io::ErrorKind::OutOfMemory, "mock failure"),
            });
        }
        self.log.maps.fetch_add(1, Ordering::SeqCst);
        let len = if self.short_map {
            layout.length.saturating_sub(1)
        } else {
            layout.length
        };
        Ok(vec![0; len])
    }

    fn unmap(&mut self, _memory: Vec<u8>) {
        self.log.unmaps.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&mut self) {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
