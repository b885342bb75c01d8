//! Bounds-checked pixel access over a mapped framebuffer.
//!
//! [`FramebufferSurface`] owns the memory backing an output (in the backend
//! that is a `memmap2::MmapMut`, in tests a plain `Vec<u8>`) together with the
//! [`SurfaceLayout`] describing it.  It refuses memory whose length does not
//! match the layout, so every accessor below can rely on
//! `memory.len() == layout.length`.
//!
//! Renderers never see the owner.  They get a [`SurfaceView`], a borrow that
//! cannot outlive the surface, so nothing can keep writing into a region
//! after the output has unmapped it.
//!
//! Pixels are written as native-endian words of the format's width, which is
//! how pixman-style formats are defined.

use std::ops::DerefMut;

use thiserror::Error;

use crate::domain::damage::Rect;
use crate::domain::screen::{PixelFormat, SurfaceLayout};

/// Errors produced when wrapping memory as a surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("mapped region is {actual} bytes but the layout requires {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A mapped framebuffer of fixed geometry.
#[derive(Debug)]
pub struct FramebufferSurface<M> {
    memory: M,
    layout: SurfaceLayout,
}

impl<M> FramebufferSurface<M>
where
    M: DerefMut<Target = [u8]>,
{
    /// Wraps `memory` as a surface of `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::LengthMismatch`] unless `memory` is exactly
    /// `layout.length` bytes long.
    pub fn new(memory: M, layout: SurfaceLayout) -> Result<Self, SurfaceError> {
        if memory.len() != layout.length {
            return Err(SurfaceError::LengthMismatch {
                expected: layout.length,
                actual: memory.len(),
            });
        }
        Ok(Self { memory, layout })
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    /// Read-only access to the raw bytes, e.g. for checksumming in tests.
    pub fn as_bytes(&self) -> &[u8] {
        &self.memory
    }

    /// Borrows the surface for drawing.
    pub fn view_mut(&mut self) -> SurfaceView<'_> {
        SurfaceView {
            bytes: &mut self.memory,
            layout: self.layout,
        }
    }

    /// Gives the memory back to the caller, e.g. to unmap it.
    pub fn into_memory(self) -> M {
        self.memory
    }
}

/// A borrowed, drawable view of a [`FramebufferSurface`].
#[derive(Debug)]
pub struct SurfaceView<'a> {
    bytes: &'a mut [u8],
    layout: SurfaceLayout,
}

impl<'a> SurfaceView<'a> {
    /// Wraps a caller-owned buffer; fails if its length does not match `layout`.
    pub fn from_slice(bytes: &'a mut [u8], layout: SurfaceLayout) -> Result<Self, SurfaceError> {
        if bytes.len() != layout.length {
            return Err(SurfaceError::LengthMismatch {
                expected: layout.length,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes, layout })
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Returns row `y`, or `None` if it lies outside the surface.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.layout.height {
            return None;
        }
        let start = y as usize * self.layout.stride;
        self.bytes.get_mut(start..start + self.layout.stride)
    }

    /// Reads the pixel word at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        let offset = self.offset_of(x, y)?;
        let bpp = self.layout.format.bytes_per_pixel();
        let px = self.bytes.get(offset..offset + bpp)?;
        Some(match bpp {
            2 => u16::from_ne_bytes([px[0], px[1]]) as u32,
            _ => u32::from_ne_bytes([px[0], px[1], px[2], px[3]]),
        })
    }

    /// Writes one pixel; returns `false` if `(x, y)` is off the surface.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: u32) -> bool {
        let Some(offset) = self.offset_of(x, y) else {
            return false;
        };
        let encoded = encode_pixel(self.layout.format, color);
        let bpp = encoded.len();
        match self.bytes.get_mut(offset..offset + bpp) {
            Some(dst) => {
                dst.copy_from_slice(&encoded);
                true
            }
            None => false,
        }
    }

    /// Fills `rect`, clipped to the surface, with `color`.
    ///
    /// Returns the number of pixels written.
    pub fn fill_rect(&mut self, rect: Rect, color: u32) -> usize {
        let Some(clipped) = rect.clip_to(self.layout.width, self.layout.height) else {
            return 0;
        };
        let encoded = encode_pixel(self.layout.format, color);
        let bpp = encoded.len();
        let x0 = clipped.x as usize * bpp;
        let x1 = x0 + clipped.width as usize * bpp;

        let mut written = 0;
        for y in clipped.y as u32..clipped.y as u32 + clipped.height {
            if let Some(row) = self.row_mut(y) {
                for px in row[x0..x1].chunks_exact_mut(bpp) {
                    px.copy_from_slice(&encoded);
                    written += 1;
                }
            }
        }
        written
    }

    /// Fills the whole surface with `color`.
    pub fn fill(&mut self, color: u32) -> usize {
        self.fill_rect(Rect::new(0, 0, self.layout.width, self.layout.height), color)
    }

    fn offset_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.layout.width || y >= self.layout.height {
            return None;
        }
        Some(y as usize * self.layout.stride + x as usize * self.layout.format.bytes_per_pixel())
    }
}

fn encode_pixel(format: PixelFormat, color: u32) -> Vec<u8> {
    match format.bytes_per_pixel() {
        2 => (color as u16).to_ne_bytes().to_vec(),
        _ => color.to_ne_bytes().to_vec(),
    }
}
