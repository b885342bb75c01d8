//! vfb-inject: sends one input event to a running vfb-backend.
//!
//! ```text
//! vfb-inject move 120 80
//! vfb-inject key 30 down
//! vfb-inject button 272 up
//! vfb-inject scroll vertical -1
//! ```

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vfb_backend::infrastructure::network::{client::InputClient, listener::DEFAULT_SOCKET_PATH};
use vfb_core::protocol::events::{
    ButtonAction, InputEvent, KeyAction, KeyEvent, PointerButtonEvent, PointerMoveEvent,
    ScrollAxis, ScrollEvent,
};

#[derive(Debug, Parser)]
#[command(name = "vfb-inject", about = "Send an input event to vfb-backend", version)]
struct Cli {
    /// Injection socket of the backend.
    #[arg(long, default_value = DEFAULT_SOCKET_PATH, env = "VFB_SOCKET")]
    socket_path: PathBuf,

    #[command(subcommand)]
    event: EventCommand,
}

#[derive(Debug, Subcommand)]
enum EventCommand {
    /// Press or release a key (Linux input key code).
    Key { code: u32, state: Press },
    /// Move the pointer to an absolute output position.
    Move {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Press or release a pointer button (Linux input button code).
    Button { code: u32, state: Press },
    /// Scroll by a number of wheel steps.
    Scroll {
        axis: Axis,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Press {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Axis {
    Vertical,
    Horizontal,
}

impl EventCommand {
    fn into_event(self, timestamp: u64) -> InputEvent {
        match self {
            EventCommand::Key { code, state } => InputEvent::Key(KeyEvent {
                timestamp,
                key_code: code,
                action: match state {
                    Press::Down => KeyAction::Down,
                    Press::Up => KeyAction::Up,
                },
            }),
            EventCommand::Move { x, y } => {
                InputEvent::PointerMove(PointerMoveEvent { timestamp, x, y })
            }
            EventCommand::Button { code, state } => InputEvent::PointerButton(PointerButtonEvent {
                timestamp,
                button: code,
                action: match state {
                    Press::Down => ButtonAction::Down,
                    Press::Up => ButtonAction::Up,
                },
            }),
            EventCommand::Scroll { axis, value } => InputEvent::Scroll(ScrollEvent {
                timestamp,
                axis: match axis {
                    Axis::Vertical => ScrollAxis::Vertical,
                    Axis::Horizontal => ScrollAxis::Horizontal,
                },
                value,
            }),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let event = cli.event.into_event(now_millis());

    let mut client = InputClient::connect(&cli.socket_path)
        .await
        .with_context(|| format!("connecting to {}", cli.socket_path.display()))?;
    client.send_event(&event).await.context("sending event")?;
    info!(?event, "sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_command_builds_pointer_move() {
        let cli = Cli::parse_from(["vfb-inject", "move", "10.5", "-3"]);

        let event = cli.event.into_event(7);

        assert_eq!(
            event,
            InputEvent::PointerMove(PointerMoveEvent { timestamp: 7, x: 10.5, y: -3.0 })
        );
    }

    #[test]
    fn test_key_command_builds_key_event() {
        let cli = Cli::parse_from(["vfb-inject", "key", "30", "down"]);

        let event = cli.event.into_event(1);

        assert_eq!(
            event,
            InputEvent::Key(KeyEvent { timestamp: 1, key_code: 30, action: KeyAction::Down })
        );
    }

    #[test]
    fn test_socket_path_defaults_to_backend_default() {
        let cli = Cli::parse_from(["vfb-inject", "scroll", "horizontal", "2"]);

        assert_eq!(cli.socket_path, PathBuf::from("/tmp/weston_socket"));
    }
}
