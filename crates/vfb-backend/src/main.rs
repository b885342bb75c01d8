//! vfb-backend daemon entry point.
//!
//! Wires the configured output, the injection socket, and a headless host
//! together, then runs everything on one current-thread Tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config() + CLI overrides
//!  └─ ImageBackend::add_output()      -- creates and maps the image file
//!  └─ InputListener::bind()           -- Unix socket, one client at a time
//!  └─ select! loop
//!       ├─ frame deadline  -> dispatch_timers + repaint_pending
//!       ├─ SIGUSR1         -> session deactivated (outputs unmapped)
//!       ├─ SIGUSR2         -> session activated (outputs remapped, redrawn)
//!       └─ SIGINT/SIGTERM  -> shutdown
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vfb_backend::application::backend::ImageBackend;
use vfb_backend::application::inject_input::InputSink;
use vfb_backend::application::output_lifecycle::ScreenDescriptorSource;
use vfb_backend::infrastructure::{
    framebuffer::FileFramebufferDevice,
    host::HeadlessHost,
    input_sink::logging::TracingInputSink,
    network::listener::InputListener,
    renderer::SolidFillRenderer,
    screen_info::ConfiguredScreen,
    storage::config::{load_config, BackendConfig, SinkKind},
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Virtual framebuffer display backend.
///
/// Renders into a memory-mapped image file and injects input received on a
/// Unix socket.
#[derive(Debug, Parser)]
#[command(name = "vfb-backend", version)]
struct Cli {
    /// Config file; defaults to `$XDG_CONFIG_HOME/vfb/config.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Injection socket path, overriding `[input] socket_path`.
    #[arg(long, env = "VFB_SOCKET")]
    socket_path: Option<PathBuf>,

    /// Framebuffer image file, overriding `[output] device`.
    #[arg(long, env = "VFB_DEVICE")]
    device: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset, overriding `[logging] log_level`.
    #[arg(long, env = "VFB_LOG")]
    log_level: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut BackendConfig) {
        if let Some(path) = &self.socket_path {
            config.input.socket_path = path.clone();
        }
        if let Some(device) = &self.device {
            config.output.device = device.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.log_level = level.clone();
        }
    }
}

fn build_sink(config: &BackendConfig) -> Arc<dyn InputSink> {
    match config.input.sink {
        SinkKind::Log => Arc::new(TracingInputSink),
        #[cfg(target_os = "linux")]
        SinkKind::Uinput => {
            use vfb_backend::infrastructure::input_sink::linux::UinputInputSink;
            match UinputInputSink::new("vfb-input", config.output.width, config.output.height) {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    warn!("uinput sink unavailable ({e}); logging events instead");
                    Arc::new(TracingInputSink)
                }
            }
        }
        #[cfg(not(target_os = "linux"))]
        SinkKind::Uinput => {
            warn!("uinput sink is Linux-only; logging events instead");
            Arc::new(TracingInputSink)
        }
    }
}

/// Signal streams the event loop listens on.
///
/// Installed once before the loop so a signal arriving while another branch
/// runs stays queued for the next pass.
struct DaemonSignals {
    deactivate: Signal,
    activate: Signal,
    interrupt: Signal,
    terminate: Signal,
}

impl DaemonSignals {
    fn install() -> anyhow::Result<Self> {
        Ok(Self {
            deactivate: signal(SignalKind::user_defined1()).context("installing SIGUSR1")?,
            activate: signal(SignalKind::user_defined2()).context("installing SIGUSR2")?,
            interrupt: signal(SignalKind::interrupt()).context("installing SIGINT")?,
            terminate: signal(SignalKind::terminate()).context("installing SIGTERM")?,
        })
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    cli.apply_overrides(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .init();

    info!("vfb-backend starting");

    // ── Output ────────────────────────────────────────────────────────────────
    let screen = Arc::new(ConfiguredScreen::new(config.output.descriptor()));
    let mut backend = ImageBackend::new(Arc::clone(&screen) as Arc<dyn ScreenDescriptorSource>);
    let device = FileFramebufferDevice::new(&config.output.device, config.output.device_mode);
    backend
        .add_output(&config.output.name, device)
        .with_context(|| format!("creating output on {}", config.output.device.display()))?;

    let host = HeadlessHost::new();
    let mut renderer = SolidFillRenderer::new(config.renderer.background);
    backend.start_repaint_loop(&host);
    backend.repaint_pending(&mut renderer, Instant::now());

    // ── Input socket ──────────────────────────────────────────────────────────
    let listener = InputListener::bind(&config.input).context("binding input socket")?;
    let server = listener.run(build_sink(&config));
    tokio::pin!(server);

    // ── Signals ───────────────────────────────────────────────────────────────
    let mut signals = DaemonSignals::install()?;

    info!("vfb-backend ready");

    loop {
        tokio::select! {
            _ = &mut server => {
                error!("input listener stopped");
                break;
            }
            _ = sleep_until_deadline(backend.next_frame_deadline()) => {
                let now = Instant::now();
                backend.dispatch_timers(now, &host);
                backend.repaint_pending(&mut renderer, now);
            }
            _ = signals.deactivate.recv() => {
                backend.session_notify(false, &host);
            }
            _ = signals.activate.recv() => {
                backend.session_notify(true, &host);
                if backend.outputs().is_empty() {
                    warn!("no outputs left after session activation");
                }
                backend.repaint_pending(&mut renderer, Instant::now());
            }
            _ = signals.interrupt.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
            _ = signals.terminate.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
        }
    }

    backend.shutdown();
    info!(frames = host.frames(), "vfb-backend stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
