//! # vfb-core
//!
//! Shared library for the vfb virtual display backend containing the
//! injection-socket wire format and the framebuffer domain types.
//!
//! It has zero dependencies on OS APIs, memory-mapping crates, or sockets;
//! `vfb-backend` supplies those.
//!
//! - **`protocol`** – How input events travel over the local socket.  Every
//!   message is a length-prefixed frame; the first frame of a connection is
//!   the `ClientHello` handshake, every later frame is one encoded
//!   [`InputEvent`].
//!
//! - **`domain`** – The output's mode ([`ScreenDescriptor`]), the byte layout
//!   derived from it, the bounds-checked [`FramebufferSurface`], and damage
//!   regions.

pub mod domain;
pub mod protocol;

pub use domain::damage::{Damage, Rect};
pub use domain::screen::{PixelFormat, ScreenDescriptor, ScreenError, SurfaceLayout};
pub use domain::surface::{FramebufferSurface, SurfaceError, SurfaceView};
pub use protocol::codec::{decode_event, encode_event, ProtocolError};
pub use protocol::events::InputEvent;
pub use protocol::frame::{encode_frame, FrameError};
