//! Input event types carried on the injection socket.
//!
//! The event schema is closed: a peer can only send the four event kinds
//! below.  Any other tag byte decodes to [`InputEvent::Unknown`] so the
//! session can log it and keep reading instead of dropping the connection.
//!
//! Key codes and button codes are Linux input-event codes (`KEY_*` and
//! `BTN_*` from `linux/input-event-codes.h`) and are passed through to the
//! input sink without translation.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// First payload a client must send after connecting.
pub const CLIENT_HELLO: &[u8] = b"ClientHello";

/// Reply written by the server when the handshake is accepted.
pub const SERVER_HELLO: &[u8] = b"ServerHello";

/// Size of the common event header: tag (1) + timestamp (8).
pub const EVENT_HEADER_SIZE: usize = 9;

// ── Event type codes ──────────────────────────────────────────────────────────

/// Tag byte at the start of every event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventType {
    Key = 0x01,
    PointerMove = 0x02,
    PointerButton = 0x03,
    Scroll = 0x04,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(EventType::Key),
            0x02 => Ok(EventType::PointerMove),
            0x03 => Ok(EventType::PointerButton),
            0x04 => Ok(EventType::Scroll),
            _ => Err(()),
        }
    }
}

// ── Event payloads ────────────────────────────────────────────────────────────

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeyAction {
    Down = 0x01,
    Up = 0x02,
}

impl TryFrom<u8> for KeyAction {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(KeyAction::Down),
            0x02 => Ok(KeyAction::Up),
            _ => Err(()),
        }
    }
}

/// Whether a pointer button was pressed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ButtonAction {
    Down = 0x01,
    Up = 0x02,
}

impl TryFrom<u8> for ButtonAction {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(ButtonAction::Down),
            0x02 => Ok(ButtonAction::Up),
            _ => Err(()),
        }
    }
}

/// Axis a scroll event applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScrollAxis {
    Vertical = 0x00,
    Horizontal = 0x01,
}

impl TryFrom<u8> for ScrollAxis {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x00 => Ok(ScrollAxis::Vertical),
            0x01 => Ok(ScrollAxis::Horizontal),
            _ => Err(()),
        }
    }
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Peer timestamp, forwarded to the sink unmodified.
    pub timestamp: u64,
    /// Linux `KEY_*` code.
    pub key_code: u32,
    pub action: KeyAction,
}

/// Absolute pointer position in output pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerMoveEvent {
    pub timestamp: u64,
    pub x: f64,
    pub y: f64,
}

/// A pointer button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerButtonEvent {
    pub timestamp: u64,
    /// Linux `BTN_*` code (e.g. `0x110` for the left button).
    pub button: u32,
    pub action: ButtonAction,
}

/// A scroll step on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub timestamp: u64,
    pub axis: ScrollAxis,
    /// Number of wheel steps; may be fractional or negative.
    pub value: f64,
}

// ── Top-level event enum ──────────────────────────────────────────────────────

/// One decoded event from the injection socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Key(KeyEvent),
    PointerMove(PointerMoveEvent),
    PointerButton(PointerButtonEvent),
    Scroll(ScrollEvent),
    /// A well-formed frame whose tag byte is not part of the schema.
    Unknown { event_type: u8 },
}

impl InputEvent {
    /// Returns the wire tag for this event, or `None` for [`InputEvent::Unknown`].
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            InputEvent::Key(_) => Some(EventType::Key),
            InputEvent::PointerMove(_) => Some(EventType::PointerMove),
            InputEvent::PointerButton(_) => Some(EventType::PointerButton),
            InputEvent::Scroll(_) => Some(EventType::Scroll),
            InputEvent::Unknown { .. } => None,
        }
    }

    /// Returns the peer timestamp carried by the event, if any.
    pub fn timestamp(&self) -> Option<u64> {
        match self {
            InputEvent::Key(e) => Some(e.timestamp),
            InputEvent::PointerMove(e) => Some(e.timestamp),
            InputEvent::PointerButton(e) => Some(e.timestamp),
            InputEvent::Scroll(e) => Some(e.timestamp),
            InputEvent::Unknown { .. } => None,
        }
    }
}
