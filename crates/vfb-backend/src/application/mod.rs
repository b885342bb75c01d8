//! Application layer use cases and state machines.
//!
//! - **`output_lifecycle`** – One virtual output: create, map, unmap, remap
//!   on mode change, destroy.  Defines the ports the output talks through
//!   (`FramebufferDevice`, `ScreenDescriptorSource`, `OutputRenderer`,
//!   `HostCompositor`).
//!
//! - **`backend`** – `ImageBackend`, the set of outputs plus session
//!   activation handling.
//!
//! - **`frame_scheduler`** – Single-shot repaint pacing timer.
//!
//! - **`protocol_session`** – Handshake and event dispatch for one socket
//!   connection, independent of any I/O.
//!
//! - **`inject_input`** – Forwards decoded events to an `InputSink`.
//!
//! Nothing here touches files, sockets, or the OS; those live behind the
//! ports and are implemented in `infrastructure`.

pub mod backend;
pub mod frame_scheduler;
pub mod inject_input;
pub mod output_lifecycle;
pub mod protocol_session;
