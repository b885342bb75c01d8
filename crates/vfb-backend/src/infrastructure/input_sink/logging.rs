//! An input sink that only logs.

use tracing::info;
use vfb_core::protocol::events::{ButtonAction, KeyAction};

use crate::application::inject_input::{AxisEvent, InjectionError, InputSink};

/// Logs each event at `info` and reports it delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInputSink;

impl InputSink for TracingInputSink {
    fn notify_key(&self, time: u64, key: u32, action: KeyAction) -> Result<(), InjectionError> {
        info!(time, key, ?action, "key");
        Ok(())
    }

    fn notify_motion_absolute(&self, time: u64, x: f64, y: f64) -> Result<(), InjectionError> {
        info!(time, x, y, "motion");
        Ok(())
    }

    fn notify_button(
        &self,
        time: u64,
        button: u32,
        action: ButtonAction,
    ) -> Result<(), InjectionError> {
        info!(time, button, ?action, "button");
        Ok(())
    }

    fn notify_axis(&self, time: u64, axis: AxisEvent) -> Result<(), InjectionError> {
        info!(time, axis = ?axis.axis, value = axis.value, discrete = axis.discrete, "axis");
        Ok(())
    }
}
