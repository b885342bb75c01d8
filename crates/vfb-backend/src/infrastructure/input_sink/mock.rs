//! Recording input sink for unit and integration tests.
//!
//! Every call is pushed onto a `Mutex<Vec<SinkCall>>` in arrival order, so a
//! test can assert exactly what reached the seat.  Set `should_fail` to make
//! every call return [`InjectionError::Sink`].

use std::sync::Mutex;

use vfb_core::protocol::events::{ButtonAction, KeyAction};

use crate::application::inject_input::{AxisEvent, InjectionError, InputSink};

/// One call observed by [`RecordingInputSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Key { time: u64, key: u32, action: KeyAction },
    MotionAbsolute { time: u64, x: f64, y: f64 },
    Button { time: u64, button: u32, action: ButtonAction },
    Axis { time: u64, axis: AxisEvent },
}

#[derive(Default)]
pub struct RecordingInputSink {
    pub calls: Mutex<Vec<SinkCall>>,
    /// When `true`, every method returns `InjectionError::Sink`.
    pub should_fail: bool,
}

impl RecordingInputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SinkCall) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Sink("mock failure".into()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl InputSink for RecordingInputSink {
    fn notify_key(&self, time: u64, key: u32, action: KeyAction) -> Result<(), InjectionError> {
        self.record(SinkCall::Key { time, key, action })
    }

    fn notify_motion_absolute(&self, time: u64, x: f64, y: f64) -> Result<(), InjectionError> {
        self.record(SinkCall::MotionAbsolute { time, x, y })
    }

    fn notify_button(
        &self,
        time: u64,
        button: u32,
        action: ButtonAction,
    ) -> Result<(), InjectionError> {
        self.record(SinkCall::Button { time, button, action })
    }

    fn notify_axis(&self, time: u64, axis: AxisEvent) -> Result<(), InjectionError> {
        self.record(SinkCall::Axis { time, axis })
    }
}
