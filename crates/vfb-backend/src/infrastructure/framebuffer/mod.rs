//! Framebuffer storage backed by a regular file.
//!
//! The image output renders into a shared memory mapping of a file so that
//! an external process (a capture client, a VNC bridge, `cat`) can read the
//! current frame without talking to the compositor.  The file is created at
//! the configured path, sized to exactly the surface length, and given the
//! configured permission bits.  It is left on disk after the output closes.

pub mod mock;

use std::fs::{File, OpenOptions, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, warn};
use vfb_core::domain::screen::SurfaceLayout;

use crate::application::output_lifecycle::{FramebufferDevice, OutputError};

/// Default path of the framebuffer image file.
pub const DEFAULT_DEVICE_PATH: &str = "/tmp/image.bin";

/// Default permission bits of the framebuffer image file.
pub const DEFAULT_DEVICE_MODE: u32 = 0o644;

/// A [`FramebufferDevice`] that maps a file on disk.
pub struct FileFramebufferDevice {
    path: PathBuf,
    mode: u32,
    file: Option<File>,
}

impl FileFramebufferDevice {
    pub fn new(path: impl Into<PathBuf>, mode: u32) -> Self {
        Self {
            path: path.into(),
            mode,
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn storage_error(&self, operation: &'static str, source: io::Error) -> OutputError {
        OutputError::Storage {
            operation,
            target: self.path.display().to_string(),
            source,
        }
    }
}

impl FramebufferDevice for FileFramebufferDevice {
    type Memory = MmapMut;

    fn open(&mut self, layout: &SurfaceLayout) -> Result<(), OutputError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.storage_error("open", e))?;
        file.set_len(layout.length as u64)
            .map_err(|e| self.storage_error("resize", e))?;
        file.set_permissions(Permissions::from_mode(self.mode))
            .map_err(|e| self.storage_error("chmod", e))?;

        debug!(path = %self.path.display(), len = layout.length, "framebuffer file ready");
        self.file = Some(file);
        Ok(())
    }

    fn map(&mut self, layout: &SurfaceLayout) -> Result<MmapMut, OutputError> {
        let Some(file) = self.file.as_ref() else {
            return Err(self.storage_error(
                "map",
                io::Error::new(io::ErrorKind::NotFound, "storage is not open"),
            ));
        };
        // SAFETY: the file is owned by this device and sized to
        // `layout.length` in `open`.  Readers outside the process only read;
        // a concurrent truncation by another writer is outside our contract.
        let mapping = unsafe { MmapOptions::new().len(layout.length).map_mut(file) };
        mapping.map_err(|e| self.storage_error("map", e))
    }

    fn unmap(&mut self, memory: MmapMut) {
        if let Err(e) = memory.flush() {
            warn!(path = %self.path.display(), "flushing framebuffer failed: {e}");
        }
        drop(memory);
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!(path = %self.path.display(), "framebuffer file closed");
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
