//! Binary codec for input event payloads.
//!
//! Wire format (inside one length-prefixed frame):
//! ```text
//! [event_type:1][timestamp:8][body:N]
//!
//! 0x01 Key      body: [key_code:4][action:1]
//! 0x02 Motion   body: [x:8][y:8]              (IEEE-754 f64)
//! 0x03 Button   body: [button:4][action:1]
//! 0x04 Scroll   body: [axis:1][value:8]       (IEEE-754 f64)
//! ```
//! All multi-byte fields are big-endian.  Bytes after the known body are
//! ignored so newer peers can append fields without breaking older servers.

use thiserror::Error;

use crate::protocol::events::{
    ButtonAction, EventType, InputEvent, KeyAction, KeyEvent, PointerButtonEvent,
    PointerMoveEvent, ScrollAxis, ScrollEvent, EVENT_HEADER_SIZE,
};

/// Errors that can occur during event encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The payload is shorter than the event header.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The body could not be parsed (too short, field value out of range).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// [`InputEvent::Unknown`] has no wire body and cannot be sent.
    #[error("event type 0x{0:02X} cannot be encoded")]
    UnencodableEvent(u8),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`InputEvent`] into a frame payload (without length prefix).
///
/// # Errors
///
/// Returns [`ProtocolError::UnencodableEvent`] for [`InputEvent::Unknown`].
///
/// # Examples
///
/// ```rust
/// use vfb_core::protocol::codec::{decode_event, encode_event};
/// use vfb_core::protocol::events::{InputEvent, PointerMoveEvent};
///
/// let event = InputEvent::PointerMove(PointerMoveEvent { timestamp: 5, x: 10.0, y: 20.0 });
/// let bytes = encode_event(&event).unwrap();
/// assert_eq!(bytes.len(), 25);
/// assert_eq!(decode_event(&bytes).unwrap(), event);
/// ```
pub fn encode_event(event: &InputEvent) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(EVENT_HEADER_SIZE + 16);
    match event {
        InputEvent::Key(e) => {
            write_header(&mut buf, EventType::Key, e.timestamp);
            buf.extend_from_slice(&e.key_code.to_be_bytes());
            buf.push(e.action as u8);
        }
        InputEvent::PointerMove(e) => {
            write_header(&mut buf, EventType::PointerMove, e.timestamp);
            buf.extend_from_slice(&e.x.to_be_bytes());
            buf.extend_from_slice(&e.y.to_be_bytes());
        }
        InputEvent::PointerButton(e) => {
            write_header(&mut buf, EventType::PointerButton, e.timestamp);
            buf.extend_from_slice(&e.button.to_be_bytes());
            buf.push(e.action as u8);
        }
        InputEvent::Scroll(e) => {
            write_header(&mut buf, EventType::Scroll, e.timestamp);
            buf.push(e.axis as u8);
            buf.extend_from_slice(&e.value.to_be_bytes());
        }
        InputEvent::Unknown { event_type } => {
            return Err(ProtocolError::UnencodableEvent(*event_type));
        }
    }
    Ok(buf)
}

/// Decodes one frame payload into an [`InputEvent`].
///
/// An unrecognised tag byte is not an error: it yields
/// [`InputEvent::Unknown`] so the caller can skip it and continue.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] if the payload is shorter than
/// the 9-byte header, and [`ProtocolError::MalformedPayload`] if a known
/// event's body is truncated or carries an out-of-range action/axis byte.
pub fn decode_event(payload: &[u8]) -> Result<InputEvent, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::InsufficientData {
            needed: EVENT_HEADER_SIZE,
            available: 0,
        });
    }

    let tag = payload[0];
    let Ok(event_type) = EventType::try_from(tag) else {
        return Ok(InputEvent::Unknown { event_type: tag });
    };

    if payload.len() < EVENT_HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: EVENT_HEADER_SIZE,
            available: payload.len(),
        });
    }

    let timestamp = read_u64(payload, 1)?;
    let body = &payload[EVENT_HEADER_SIZE..];

    match event_type {
        EventType::Key => decode_key(body, timestamp).map(InputEvent::Key),
        EventType::PointerMove => decode_motion(body, timestamp).map(InputEvent::PointerMove),
        EventType::PointerButton => decode_button(body, timestamp).map(InputEvent::PointerButton),
        EventType::Scroll => decode_scroll(body, timestamp).map(InputEvent::Scroll),
    }
}

// ── Body decoding ─────────────────────────────────────────────────────────────

fn decode_key(p: &[u8], timestamp: u64) -> Result<KeyEvent, ProtocolError> {
    // 4 (key_code) + 1 (action) = 5
    require_len(p, 5, "Key")?;
    let key_code = u32::from_be_bytes([p[0], p[1], p[2], p[3]]);
    let action = KeyAction::try_from(p[4])
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown key action: {}", p[4])))?;
    Ok(KeyEvent {
        timestamp,
        key_code,
        action,
    })
}

fn decode_motion(p: &[u8], timestamp: u64) -> Result<PointerMoveEvent, ProtocolError> {
    // 8 (x) + 8 (y) = 16
    require_len(p, 16, "PointerMove")?;
    let x = read_f64(p, 0)?;
    let y = read_f64(p, 8)?;
    Ok(PointerMoveEvent { timestamp, x, y })
}

fn decode_button(p: &[u8], timestamp: u64) -> Result<PointerButtonEvent, ProtocolError> {
    require_len(p, 5, "PointerButton")?;
    let button = u32::from_be_bytes([p[0], p[1], p[2], p[3]]);
    let action = ButtonAction::try_from(p[4])
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown button action: {}", p[4])))?;
    Ok(PointerButtonEvent {
        timestamp,
        button,
        action,
    })
}

fn decode_scroll(p: &[u8], timestamp: u64) -> Result<ScrollEvent, ProtocolError> {
    // 1 (axis) + 8 (value) = 9
    require_len(p, 9, "Scroll")?;
    let axis = ScrollAxis::try_from(p[0])
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown scroll axis: {}", p[0])))?;
    let value = read_f64(p, 1)?;
    Ok(ScrollEvent {
        timestamp,
        axis,
        value,
    })
}

// ── Byte helpers ──────────────────────────────────────────────────────────────

fn write_header(buf: &mut Vec<u8>, event_type: EventType, timestamp: u64) {
    buf.push(event_type as u8);
    buf.extend_from_slice(&timestamp.to_be_bytes());
}

fn require_len(buf: &[u8], needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: need {needed} bytes, got {}",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    let bytes: [u8; 8] = buf
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or(ProtocolError::InsufficientData {
            needed: offset + 8,
            available: buf.len(),
        })?;
    Ok(u64::from_be_bytes(bytes))
}

fn read_f64(buf: &[u8], offset: usize) -> Result<f64, ProtocolError> {
    read_u64(buf, offset).map(f64::from_bits)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(event: &InputEvent) -> InputEvent {
        let encoded = encode_event(event).expect("encode failed");
        decode_event(&encoded).expect("decode failed")
    }

    // ── Known events ─────────────────────────────────────────────────────────

    #[test]
    fn test_key_down_round_trip() {
        let event = InputEvent::Key(KeyEvent {
            timestamp: 1_000,
            key_code: 30, // KEY_A
            action: KeyAction::Down,
        });
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_button_up_round_trip() {
        let event = InputEvent::PointerButton(PointerButtonEvent {
            timestamp: u64::MAX,
            button: 0x110, // BTN_LEFT
            action: ButtonAction::Up,
        });
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_negative_fractional_scroll_round_trip() {
        let event = InputEvent::Scroll(ScrollEvent {
            timestamp: 9,
            axis: ScrollAxis::Horizontal,
            value: -1.5,
        });
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_motion_encodes_expected_byte_layout() {
        // Arrange
        let event = InputEvent::PointerMove(PointerMoveEvent {
            timestamp: 0x0102_0304_0506_0708,
            x: 1.0,
            y: -2.0,
        });

        // Act
        let bytes = encode_event(&event).unwrap();

        // Assert
        assert_eq!(bytes[0], 0x02);
        assert_eq!(&bytes[1..9], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[9..17], &1.0f64.to_be_bytes());
        assert_eq!(&bytes[17..25], &(-2.0f64).to_be_bytes());
    }

    // ── Forward compatibility ────────────────────────────────────────────────

    #[test]
    fn test_trailing_bytes_after_body_are_ignored() {
        // Arrange
        let event = InputEvent::Key(KeyEvent {
            timestamp: 3,
            key_code: 28,
            action: KeyAction::Up,
        });
        let mut bytes = encode_event(&event).unwrap();
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        // Act / Assert
        assert_eq!(decode_event(&bytes).unwrap(), event);
    }

    #[test]
    fn test_unknown_tag_decodes_to_unknown_variant() {
        let decoded = decode_event(&[0x7F, 0, 0]).unwrap();
        assert_eq!(decoded, InputEvent::Unknown { event_type: 0x7F });
    }

    #[test]
    fn test_handshake_literal_sent_mid_stream_is_unknown() {
        // 'C' (0x43) is not a known tag.
        let decoded = decode_event(b"ClientHello").unwrap();
        assert_eq!(decoded, InputEvent::Unknown { event_type: b'C' });
    }

    // ── Malformed payloads ───────────────────────────────────────────────────

    #[test]
    fn test_empty_payload_is_insufficient_data() {
        assert_eq!(
            decode_event(&[]),
            Err(ProtocolError::InsufficientData {
                needed: EVENT_HEADER_SIZE,
                available: 0
            })
        );
    }

    #[test]
    fn test_truncated_header_is_insufficient_data() {
        let result = decode_event(&[0x01, 0, 0, 0]);
        assert_eq!(
            result,
            Err(ProtocolError::InsufficientData {
                needed: EVENT_HEADER_SIZE,
                available: 4
            })
        );
    }

    #[test]
    fn test_truncated_motion_body_is_malformed() {
        let mut bytes = vec![0x02];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 15]);

        let result = decode_event(&bytes);

        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_invalid_key_action_is_malformed() {
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&30u32.to_be_bytes());
        bytes.push(0x09);

        let result = decode_event(&bytes);

        assert!(matches!(result, Err(ProtocolError::MalformedPayload(msg)) if msg.contains("key action")));
    }

    #[test]
    fn test_invalid_scroll_axis_is_malformed() {
        let mut bytes = vec![0x04];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.push(0x05);
        bytes.extend_from_slice(&1.0f64.to_be_bytes());

        assert!(matches!(decode_event(&bytes), Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_unknown_event_cannot_be_encoded() {
        let result = encode_event(&InputEvent::Unknown { event_type: 0x42 });
        assert_eq!(result, Err(ProtocolError::UnencodableEvent(0x42)));
    }
}
