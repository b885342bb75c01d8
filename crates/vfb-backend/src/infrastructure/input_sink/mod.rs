//! Input sink implementations.
//!
//! - [`logging::TracingInputSink`] logs every event and delivers nowhere.
//!   It is the default when no seat is available, and handy for watching a
//!   capture client's traffic.
//! - `linux::UinputInputSink` creates a kernel virtual device through
//!   `/dev/uinput`, so injected events reach whatever compositor reads evdev.
//! - [`mock::RecordingInputSink`] records calls for tests.

pub mod mock;
pub mod logging;

#[cfg(target_os = "linux")]
pub mod linux;
