//! Domain entities for the virtual framebuffer output.
//!
//! Pure data and arithmetic: no file handles, no sockets, no mappings.  The
//! backend crate supplies the memory and the I/O; everything here can be
//! tested with plain `Vec<u8>` buffers.
//!
//! - **`screen`** – [`screen::ScreenDescriptor`] (the output's mode) and the
//!   [`screen::SurfaceLayout`] derived from it.
//! - **`surface`** – [`surface::FramebufferSurface`], the bounds-checked
//!   wrapper around the mapped pixel memory.
//! - **`damage`** – rectangles that need repainting.

pub mod damage;
pub mod screen;
pub mod surface;
