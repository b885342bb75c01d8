//! Screen descriptor and the memory layout derived from it.
//!
//! A [`ScreenDescriptor`] is what the output asks its descriptor source for
//! every time it is created or re-enabled: resolution, physical size, pixel
//! format and refresh rate.  From it the backend derives a
//! [`SurfaceLayout`], the exact byte geometry of the mapped framebuffer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default identifier reported for the image output.
pub const DEFAULT_SCREEN_ID: &str = "imagescreen";

/// Default refresh rate in millihertz (60 Hz).
pub const DEFAULT_REFRESH_MHZ: u32 = 60_000;

/// Errors produced when a descriptor cannot describe a usable surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("invalid screen size {width}x{height}: both dimensions must be at least 1")]
    InvalidSize { width: u32, height: u32 },

    #[error("refresh rate must be non-zero")]
    ZeroRefresh,

    #[error("{bits_per_pixel} bits per pixel does not match pixel format {format:?}")]
    BitsPerPixelMismatch {
        bits_per_pixel: u32,
        format: PixelFormat,
    },

    #[error("surface of {width}x{height} at {bits_per_pixel} bpp overflows addressable memory")]
    TooLarge {
        width: u32,
        height: u32,
        bits_per_pixel: u32,
    },
}

// ── Pixel formats ─────────────────────────────────────────────────────────────

/// Pixel formats the framebuffer can be configured with.
///
/// Names follow the DRM/pixman convention: components listed from the most
/// significant bits of a native-endian pixel word to the least significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    A8B8G8R8,
    X8R8G8B8,
    A8R8G8B8,
    R5G6B5,
}

impl PixelFormat {
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::A8B8G8R8 | PixelFormat::X8R8G8B8 | PixelFormat::A8R8G8B8 => 32,
            PixelFormat::R5G6B5 => 16,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }
}

// ── Descriptor ────────────────────────────────────────────────────────────────

/// Immutable snapshot of an output's mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDescriptor {
    pub width: u32,
    pub height: u32,
    /// Physical width in millimetres.
    pub width_mm: u32,
    /// Physical height in millimetres.
    pub height_mm: u32,
    pub bits_per_pixel: u32,
    pub pixel_format: PixelFormat,
    pub refresh_mhz: u32,
    /// Opaque identifier reported to the host; not part of the mode.
    pub id: String,
}

impl Default for ScreenDescriptor {
    /// 800x600 at 60 Hz, 32 bpp `a8b8g8r8`, physical size equal to the
    /// pixel resolution.
    fn default() -> Self {
        Self::with_size(800, 600)
    }
}

impl ScreenDescriptor {
    /// Default descriptor resized to `width` x `height`.
    ///
    /// The physical size follows the resolution (one pixel per millimetre),
    /// which is what headless consumers of the image expect.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            width_mm: width,
            height_mm: height,
            bits_per_pixel: PixelFormat::default().bits_per_pixel(),
            pixel_format: PixelFormat::default(),
            refresh_mhz: DEFAULT_REFRESH_MHZ,
            id: DEFAULT_SCREEN_ID.to_string(),
        }
    }

    /// Returns `true` if both descriptors describe the same mode.
    ///
    /// Every field except `id` is compared.  Two descriptors that differ only
    /// in their id can share a mapped surface.
    pub fn same_mode(&self, other: &ScreenDescriptor) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.width_mm == other.width_mm
            && self.height_mm == other.height_mm
            && self.bits_per_pixel == other.bits_per_pixel
            && self.pixel_format == other.pixel_format
            && self.refresh_mhz == other.refresh_mhz
    }

    /// Derives the byte layout of a framebuffer for this descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError`] if the size or refresh rate is zero, the bpp does
    /// not match the format, or the buffer length would overflow `usize`.
    pub fn layout(&self) -> Result<SurfaceLayout, ScreenError> {
        if self.width == 0 || self.height == 0 {
            return Err(ScreenError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.refresh_mhz == 0 {
            return Err(ScreenError::ZeroRefresh);
        }
        if self.bits_per_pixel != self.pixel_format.bits_per_pixel() {
            return Err(ScreenError::BitsPerPixelMismatch {
                bits_per_pixel: self.bits_per_pixel,
                format: self.pixel_format,
            });
        }

        let too_large = || ScreenError::TooLarge {
            width: self.width,
            height: self.height,
            bits_per_pixel: self.bits_per_pixel,
        };
        let stride = (self.width as usize)
            .checked_mul(self.pixel_format.bytes_per_pixel())
            .ok_or_else(too_large)?;
        let length = stride
            .checked_mul(self.height as usize)
            .ok_or_else(too_large)?;

        Ok(SurfaceLayout {
            width: self.width,
            height: self.height,
            stride,
            length,
            format: self.pixel_format,
        })
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Byte geometry of a framebuffer.
///
/// Rows are tightly packed: `stride == width * bytes_per_pixel` and
/// `length == stride * height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub width: u32,
    pub height: u32,
    /// Bytes per row.
    pub stride: usize,
    /// Total buffer size in bytes.
    pub length: usize,
    pub format: PixelFormat,
}
