//! Infrastructure layer for the backend.
//!
//! Contains OS-facing adapters: the memory-mapped framebuffer file, the Unix
//! socket server, input sinks, and configuration loading.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `vfb_core`, but MUST NOT be imported by the `application` layer outside of
//! its tests.
//!
//! # Sub-modules
//!
//! - **`framebuffer`** – `FileFramebufferDevice`, a `FramebufferDevice` backed
//!   by `memmap2`.  A heap-backed mock is provided for tests.
//!
//! - **`screen_info`** – Descriptor sources: the configured screen, which can
//!   be resized at runtime, and a scriptable mock.
//!
//! - **`renderer`** – `SolidFillRenderer`, clearing damage to a background
//!   colour.
//!
//! - **`host`** – `HeadlessHost`, the presentation clock and frame
//!   bookkeeping used by the standalone daemon.
//!
//! - **`input_sink`** – Where injected events go: a logger, a uinput virtual
//!   device (Linux), or a recorder for tests.
//!
//! - **`network`** – Unix socket listener, per-connection session driver,
//!   and the matching client.
//!
//! - **`storage`** – TOML configuration.

pub mod framebuffer;
pub mod host;
pub mod input_sink;
pub mod network;
pub mod renderer;
pub mod screen_info;
pub mod storage;
