//! Protocol module: length-prefix framing, event types, and the event codec.

pub mod codec;
pub mod connection_id;
pub mod events;
pub mod frame;

pub use codec::{decode_event, encode_event, ProtocolError};
pub use connection_id::{ConnectionCounter, ConnectionId};
pub use events::*;
pub use frame::{decode_frame, encode_frame, read_frame_length, FrameDecode, FrameError};
