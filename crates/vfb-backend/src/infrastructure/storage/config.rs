//! TOML configuration for the backend daemon.
//!
//! Looked up at `--config <path>` when given, otherwise at
//! `$XDG_CONFIG_HOME/vfb/config.toml` (falling back to
//! `~/.config/vfb/config.toml`).  Every field has a default, so a partial
//! file only overrides what it names and a missing default file means
//! "all defaults":
//!
//! ```toml
//! [output]
//! name = "image"
//! device = "/tmp/image.bin"
//! width = 1024
//! height = 768
//! pixel_format = "x8r8g8b8"
//!
//! [input]
//! socket_path = "/run/vfb/input.sock"
//! sink = "uinput"
//!
//! [renderer]
//! background = 0xFF000000
//!
//! [logging]
//! log_level = "debug"
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vfb_core::domain::screen::{
    PixelFormat, ScreenDescriptor, DEFAULT_REFRESH_MHZ, DEFAULT_SCREEN_ID,
};
use vfb_core::protocol::events::CLIENT_HELLO;
use vfb_core::protocol::frame::DEFAULT_MAX_FRAME_LEN;

use crate::infrastructure::framebuffer::{DEFAULT_DEVICE_MODE, DEFAULT_DEVICE_PATH};
use crate::infrastructure::network::listener::{DEFAULT_SOCKET_MODE, DEFAULT_SOCKET_PATH};
use crate::infrastructure::renderer::DEFAULT_BACKGROUND;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The virtual output and its backing file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_name")]
    pub name: String,
    /// Framebuffer image file.
    #[serde(default = "default_device")]
    pub device: PathBuf,
    /// Permission bits of the image file.
    #[serde(default = "default_device_mode")]
    pub device_mode: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub pixel_format: PixelFormat,
    /// Refresh rate in millihertz.
    #[serde(default = "default_refresh_mhz")]
    pub refresh_mhz: u32,
    #[serde(default = "default_screen_id")]
    pub id: String,
}

/// Which [`InputSink`](crate::application::inject_input::InputSink) receives
/// injected events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Log every event.
    #[default]
    Log,
    /// Inject through a uinput virtual device (Linux only).
    Uinput,
}

/// The injection socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_socket_mode")]
    pub socket_mode: u32,
    /// Largest frame payload accepted from a client.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
    #[serde(default)]
    pub sink: SinkKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RendererConfig {
    /// ARGB colour damaged regions are cleared to.
    #[serde(default = "default_background")]
    pub background: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_output_name() -> String {
    "image".to_string()
}
fn default_device() -> PathBuf {
    PathBuf::from(DEFAULT_DEVICE_PATH)
}
fn default_device_mode() -> u32 {
    DEFAULT_DEVICE_MODE
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_refresh_mhz() -> u32 {
    DEFAULT_REFRESH_MHZ
}
fn default_screen_id() -> String {
    DEFAULT_SCREEN_ID.to_string()
}
fn default_socket_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}
fn default_socket_mode() -> u32 {
    DEFAULT_SOCKET_MODE
}
fn default_max_frame_len() -> usize {
    DEFAULT_MAX_FRAME_LEN
}
fn default_background() -> u32 {
    DEFAULT_BACKGROUND
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: default_output_name(),
            device: default_device(),
            device_mode: default_device_mode(),
            width: default_width(),
            height: default_height(),
            pixel_format: PixelFormat::default(),
            refresh_mhz: default_refresh_mhz(),
            id: default_screen_id(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            socket_mode: default_socket_mode(),
            max_frame_len: default_max_frame_len(),
            sink: SinkKind::default(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl OutputConfig {
    /// The descriptor this output starts with.
    ///
    /// The physical size follows the resolution.
    pub fn descriptor(&self) -> ScreenDescriptor {
        ScreenDescriptor {
            width: self.width,
            height: self.height,
            width_mm: self.width,
            height_mm: self.height,
            bits_per_pixel: self.pixel_format.bits_per_pixel(),
            pixel_format: self.pixel_format,
            refresh_mhz: self.refresh_mhz,
            id: self.id.clone(),
        }
    }
}

impl BackendConfig {
    /// Rejects values the backend cannot start with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.output
            .descriptor()
            .layout()
            .map_err(|e| ConfigError::Invalid(format!("[output]: {e}")))?;
        if self.input.max_frame_len < CLIENT_HELLO.len() {
            return Err(ConfigError::Invalid(format!(
                "[input] max_frame_len {} is smaller than the handshake",
                self.input.max_frame_len
            )));
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when neither `XDG_CONFIG_HOME` nor
/// `HOME` is set.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    default_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
    .ok_or(ConfigError::NoConfigDir)
}

fn default_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("vfb").join("config.toml"))
}

/// Loads the configuration.
///
/// With `explicit` set, that file must exist.  Without it, the default path
/// is tried; a missing file, or no config directory at all, yields
/// [`BackendConfig::default`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, [`ConfigError::Parse`]
/// for malformed TOML, and [`ConfigError::Invalid`] for unusable values.
pub fn load_config(explicit: Option<&Path>) -> Result<BackendConfig, ConfigError> {
    match explicit {
        Some(path) => load_file(path, true),
        None => load_default(config_file_path().ok()),
    }
}

fn load_default(path: Option<PathBuf>) -> Result<BackendConfig, ConfigError> {
    match path {
        Some(path) => load_file(&path, false),
        None => {
            debug!("no config directory (XDG_CONFIG_HOME and HOME unset), using defaults");
            Ok(BackendConfig::default())
        }
    }
}

fn load_file(path: &Path, required: bool) -> Result<BackendConfig, ConfigError> {
    let config = match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "config file not found, using defaults");
            BackendConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    config.validate()?;
    Ok(config)
}

/// Parses TOML text into a [`BackendConfig`].
pub fn parse_config(content: &str) -> Result<BackendConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
