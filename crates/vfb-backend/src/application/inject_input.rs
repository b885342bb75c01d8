//! InjectInputUseCase: forwards decoded socket events to the compositor seat.
//!
//! This use case sits at the application layer and delegates to an
//! [`InputSink`] trait object, the port through which synthesized input
//! reaches the host's input pipeline.  Sink implementations live in the
//! infrastructure layer (`infrastructure::input_sink`).
//!
//! Events are forwarded synchronously and in arrival order.  The peer's
//! timestamp is handed to the sink untouched; this layer never rewrites it.

use std::sync::Arc;

use thiserror::Error;
use vfb_core::protocol::events::{
    ButtonAction, InputEvent, KeyAction, KeyEvent, PointerButtonEvent, PointerMoveEvent,
    ScrollAxis, ScrollEvent,
};

/// Scale applied to a scroll step before it reaches the sink.
///
/// One wheel notch on the wire becomes ten units of axis motion, the same
/// step size the compositor uses for physical wheels.
pub const SCROLL_STEP: f64 = 10.0;

/// Error type for input injection.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("input sink error: {0}")]
    Sink(String),
    #[error("input sink is not available")]
    Unavailable,
}

/// Axis motion as delivered to the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvent {
    pub axis: ScrollAxis,
    /// Scaled motion: wire value × [`SCROLL_STEP`].
    pub value: f64,
    /// Whole wheel steps: wire value truncated toward zero.
    pub discrete: i32,
}

impl AxisEvent {
    /// Translates a wire scroll event into sink units.
    pub fn from_scroll(event: &ScrollEvent) -> Self {
        Self {
            axis: event.axis,
            value: event.value * SCROLL_STEP,
            discrete: event.value as i32,
        }
    }
}

/// The seat-facing port.
///
/// The seat itself is implicit: each sink instance is bound to one seat.
pub trait InputSink: Send + Sync {
    /// Delivers a key press or release.
    fn notify_key(&self, time: u64, key: u32, action: KeyAction) -> Result<(), InjectionError>;

    /// Moves the pointer to an absolute position in output coordinates.
    fn notify_motion_absolute(&self, time: u64, x: f64, y: f64) -> Result<(), InjectionError>;

    /// Delivers a pointer button press or release.
    fn notify_button(
        &self,
        time: u64,
        button: u32,
        action: ButtonAction,
    ) -> Result<(), InjectionError>;

    /// Delivers axis (scroll) motion.
    fn notify_axis(&self, time: u64, axis: AxisEvent) -> Result<(), InjectionError>;
}

/// What happened to one event handed to [`InjectInputUseCase::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// The sink accepted the event.
    Delivered,
    /// The event had an unknown tag and was not forwarded.
    Ignored { event_type: u8 },
}

/// The Inject Input use case.
pub struct InjectInputUseCase {
    sink: Arc<dyn InputSink>,
}

impl InjectInputUseCase {
    pub fn new(sink: Arc<dyn InputSink>) -> Self {
        Self { sink }
    }

    /// Forwards one decoded event to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] if the sink rejects the event.
    pub fn handle_event(&self, event: &InputEvent) -> Result<Injection, InjectionError> {
        match event {
            InputEvent::Key(e) => self.handle_key(e)?,
            InputEvent::PointerMove(e) => self.handle_motion(e)?,
            InputEvent::PointerButton(e) => self.handle_button(e)?,
            InputEvent::Scroll(e) => self.handle_scroll(e)?,
            InputEvent::Unknown { event_type } => {
                return Ok(Injection::Ignored {
                    event_type: *event_type,
                })
            }
        }
        Ok(Injection::Delivered)
    }

    fn handle_key(&self, event: &KeyEvent) -> Result<(), InjectionError> {
        self.sink
            .notify_key(event.timestamp, event.key_code, event.action)
    }

    fn handle_motion(&self, event: &PointerMoveEvent) -> Result<(), InjectionError> {
        self.sink
            .notify_motion_absolute(event.timestamp, event.x, event.y)
    }

    fn handle_button(&self, event: &PointerButtonEvent) -> Result<(), InjectionError> {
        self.sink
            .notify_button(event.timestamp, event.button, event.action)
    }

    fn handle_scroll(&self, event: &ScrollEvent) -> Result<(), InjectionError> {
        self.sink
            .notify_axis(event.timestamp, AxisEvent::from_scroll(event))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
