//! vfb-backend library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binaries share the same module tree.
//!
//! # What does vfb-backend do?
//!
//! It is a display backend with no display.  The host compositor gets one or
//! more *virtual outputs*; each one renders into a memory-mapped file that
//! other processes can read as a raw framebuffer.  Alongside, a Unix socket
//! accepts a capture client (for example a remote-desktop bridge) that sends
//! keyboard, pointer, and scroll events back, which are injected into the
//! host's seat as if they came from local devices.
//!
//! 1. `ImageBackend` creates and maps the output file and paces repaints with
//!    a per-output frame timer.
//! 2. Session activation changes (VT switch) unmap and remap every output.
//! 3. `InputListener` accepts one client at a time, checks the
//!    `ClientHello` / `ServerHello` handshake, then decodes framed events and
//!    forwards them to an `InputSink`.

/// Application layer: output lifecycle, frame pacing, protocol session, input
/// injection.
pub mod application;

/// Infrastructure layer: mmap storage, Unix socket server, input sinks,
/// configuration.
pub mod infrastructure;
