//! Length-prefix framing for the injection socket.
//!
//! Wire format:
//! ```text
//! [payload_len:4][payload:N]
//! ```
//! `payload_len` is a big-endian `u32`.  A length of zero is a valid, empty
//! frame.
//!
//! # Why check the length before reading? (for beginners)
//!
//! The four-byte prefix is under the peer's control.  A reader that trusts it
//! blindly would allocate up to 4 GiB for a single bogus frame.  Every reader
//! in this crate therefore calls [`read_frame_length`] first and refuses any
//! declared length above the configured maximum before a single payload
//! byte is buffered.

use thiserror::Error;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default upper bound for a single payload (64 KiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// Errors produced while framing or unframing payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The peer declared a payload larger than the receiver accepts.
    #[error("declared frame length {declared} exceeds maximum of {max} bytes")]
    Oversized { declared: usize, max: usize },

    /// The payload cannot be described by a 32-bit length prefix.
    #[error("payload of {0} bytes does not fit a 32-bit length prefix")]
    PayloadTooLarge(usize),
}

/// Result of attempting to decode one frame from a byte buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameDecode<'a> {
    /// A full frame is present at the start of the buffer.
    Complete {
        payload: &'a [u8],
        /// Prefix plus payload; advance the read cursor by this much.
        consumed: usize,
    },
    /// The buffer ends before the frame does.
    NeedMoreData { needed: usize },
}

/// Prepends the big-endian length prefix to `payload`.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] if `payload` is longer than
/// `u32::MAX` bytes.
///
/// # Examples
///
/// ```rust
/// use vfb_core::protocol::frame::encode_frame;
///
/// let frame = encode_frame(b"ClientHello").unwrap();
/// assert_eq!(&frame[..4], &[0, 0, 0, 11]);
/// assert_eq!(&frame[4..], b"ClientHello");
/// ```
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge(payload.len()))?;
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Validates a received length prefix against `max_len`.
///
/// This is the check a streaming reader performs before allocating the
/// payload buffer.
///
/// # Errors
///
/// Returns [`FrameError::Oversized`] if the declared length exceeds `max_len`.
pub fn read_frame_length(prefix: [u8; LENGTH_PREFIX_SIZE], max_len: usize) -> Result<usize, FrameError> {
    let declared = u32::from_be_bytes(prefix) as usize;
    if declared > max_len {
        return Err(FrameError::Oversized {
            declared,
            max: max_len,
        });
    }
    Ok(declared)
}

/// Decodes one frame from the start of `bytes`.
///
/// Returns [`FrameDecode::NeedMoreData`] while the prefix or the payload is
/// incomplete; nothing is ever returned for a partial frame.
///
/// # Errors
///
/// Returns [`FrameError::Oversized`] as soon as the prefix is complete and
/// declares more than `max_len` bytes, without waiting for the payload.
///
/// # Examples
///
/// ```rust
/// use vfb_core::protocol::frame::{decode_frame, encode_frame, FrameDecode, DEFAULT_MAX_FRAME_LEN};
///
/// let bytes = encode_frame(b"abc").unwrap();
/// match decode_frame(&bytes, DEFAULT_MAX_FRAME_LEN).unwrap() {
///     FrameDecode::Complete { payload, consumed } => {
///         assert_eq!(payload, b"abc");
///         assert_eq!(consumed, 7);
///     }
///     FrameDecode::NeedMoreData { .. } => unreachable!(),
/// }
/// ```
pub fn decode_frame(bytes: &[u8], max_len: usize) -> Result<FrameDecode<'_>, FrameError> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return Ok(FrameDecode::NeedMoreData {
            needed: LENGTH_PREFIX_SIZE - bytes.len(),
        });
    }

    let prefix = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let payload_len = read_frame_length(prefix, max_len)?;

    let total = LENGTH_PREFIX_SIZE + payload_len;
    if bytes.len() < total {
        return Ok(FrameDecode::NeedMoreData {
            needed: total - bytes.len(),
        });
    }

    Ok(FrameDecode::Complete {
        payload: &bytes[LENGTH_PREFIX_SIZE..total],
        consumed: total,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_prefixes_big_endian_length() {
        // Arrange
        let payload = vec![0xAB; 0x0102];

        // Act
        let frame = encode_frame(&payload).unwrap();

        // Assert
        assert_eq!(&frame[..4], &[0x00, 0x00, 0x01, 0x02]);
        assert_eq!(frame.len(), 4 + 0x0102);
    }

    #[test]
    fn test_empty_payload_is_a_valid_frame() {
        let frame = encode_frame(&[]).unwrap();
        assert_eq!(frame, vec![0, 0, 0, 0]);

        let decoded = decode_frame(&frame, DEFAULT_MAX_FRAME_LEN).unwrap();
        assert_eq!(
            decoded,
            FrameDecode::Complete {
                payload: &[],
                consumed: 4
            }
        );
    }

    #[test]
    fn test_decode_frame_reports_missing_prefix_bytes() {
        let decoded = decode_frame(&[0x00, 0x00], DEFAULT_MAX_FRAME_LEN).unwrap();
        assert_eq!(decoded, FrameDecode::NeedMoreData { needed: 2 });
    }

    #[test]
    fn test_decode_frame_reports_missing_payload_bytes() {
        // Arrange – prefix declares 10 bytes, only 3 follow
        let bytes = [0x00, 0x00, 0x00, 0x0A, 1, 2, 3];

        // Act
        let decoded = decode_frame(&bytes, DEFAULT_MAX_FRAME_LEN).unwrap();

        // Assert
        assert_eq!(decoded, FrameDecode::NeedMoreData { needed: 7 });
    }

    #[test]
    fn test_decode_frame_leaves_following_frame_untouched() {
        // Arrange – two frames back to back
        let mut bytes = encode_frame(b"first").unwrap();
        bytes.extend(encode_frame(b"second").unwrap());

        // Act
        let FrameDecode::Complete { payload, consumed } =
            decode_frame(&bytes, DEFAULT_MAX_FRAME_LEN).unwrap()
        else {
            panic!("first frame must be complete");
        };

        // Assert
        assert_eq!(payload, b"first");
        assert_eq!(consumed, 9);
        let FrameDecode::Complete { payload, .. } =
            decode_frame(&bytes[consumed..], DEFAULT_MAX_FRAME_LEN).unwrap()
        else {
            panic!("second frame must be complete");
        };
        assert_eq!(payload, b"second");
    }

    #[test]
    fn test_oversized_length_rejected_before_payload_arrives() {
        // Arrange – prefix only, declaring max + 1 bytes
        let prefix = ((DEFAULT_MAX_FRAME_LEN + 1) as u32).to_be_bytes();

        // Act
        let result = decode_frame(&prefix, DEFAULT_MAX_FRAME_LEN);

        // Assert
        assert_eq!(
            result,
            Err(FrameError::Oversized {
                declared: DEFAULT_MAX_FRAME_LEN + 1,
                max: DEFAULT_MAX_FRAME_LEN
            })
        );
    }

    #[test]
    fn test_read_frame_length_accepts_exact_maximum() {
        let prefix = (16u32).to_be_bytes();
        assert_eq!(read_frame_length(prefix, 16), Ok(16));
    }

    #[test]
    fn test_read_frame_length_rejects_u32_max() {
        let result = read_frame_length([0xFF; 4], DEFAULT_MAX_FRAME_LEN);
        assert!(matches!(result, Err(FrameError::Oversized { declared, .. }) if declared == u32::MAX as usize));
    }
}
