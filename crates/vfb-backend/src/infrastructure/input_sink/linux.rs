//! Input injection through a uinput virtual device.
//!
//! The sink registers one virtual device that carries keyboard keys, the
//! common pointer buttons, absolute X/Y axes sized to the output, and both
//! scroll wheels.  Every notification is written as one event plus a
//! `SYN_REPORT`, so the reading compositor sees each as a complete frame.
//!
//! Wire key and button codes are Linux input codes already and pass through
//! unchanged.  The kernel stamps its own event time; the peer timestamp is
//! only logged.
//!
//! # Permissions
//!
//! Creating the device needs write access to `/dev/uinput` (root, or a
//! udev rule granting the `input` group access).

use std::sync::{Mutex, PoisonError};

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, RelativeAxisType,
    UinputAbsSetup,
};
use tracing::{debug, info};
use vfb_core::protocol::events::{ButtonAction, KeyAction, ScrollAxis};

use crate::application::inject_input::{AxisEvent, InjectionError, InputSink};

/// Highest keyboard code registered on the device.
const MAX_KEY_CODE: u16 = 0x2ff;

/// Pointer buttons BTN_LEFT through BTN_TASK.
const POINTER_BUTTONS: std::ops::RangeInclusive<u16> = 0x110..=0x117;

/// Key value for a press, as written to evdev.
const PRESSED: i32 = 1;
const RELEASED: i32 = 0;

pub struct UinputInputSink {
    device: Mutex<VirtualDevice>,
    width: u32,
    height: u32,
}

impl UinputInputSink {
    /// Creates the virtual device, with absolute axes spanning
    /// `width` x `height` output pixels.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Unavailable`] if `/dev/uinput` cannot be
    /// opened, or [`InjectionError::Sink`] if the device cannot be built.
    pub fn new(name: &str, width: u32, height: u32) -> Result<Self, InjectionError> {
        let builder = VirtualDeviceBuilder::new().map_err(|e| {
            debug!("uinput unavailable: {e}");
            InjectionError::Unavailable
        })?;

        let mut keys = AttributeSet::<Key>::new();
        for code in 1..=MAX_KEY_CODE {
            keys.insert(Key::new(code));
        }
        for code in POINTER_BUTTONS {
            keys.insert(Key::new(code));
        }

        let mut wheels = AttributeSet::<RelativeAxisType>::new();
        wheels.insert(RelativeAxisType::REL_WHEEL);
        wheels.insert(RelativeAxisType::REL_HWHEEL);

        let abs_x = UinputAbsSetup::new(AbsoluteAxisType::ABS_X, axis_info(width));
        let abs_y = UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, axis_info(height));

        let device = builder
            .name(name)
            .with_keys(&keys)
            .and_then(|b| b.with_relative_axes(&wheels))
            .and_then(|b| b.with_absolute_axis(&abs_x))
            .and_then(|b| b.with_absolute_axis(&abs_y))
            .and_then(|b| b.build())
            .map_err(|e| InjectionError::Sink(format!("building uinput device: {e}")))?;

        info!("uinput device '{name}' created for a {width}x{height} output");
        Ok(Self {
            device: Mutex::new(device),
            width,
            height,
        })
    }

    fn emit(&self, event: InputEvent) -> Result<(), InjectionError> {
        let syn = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(&[event, syn])
            .map_err(|e| InjectionError::Sink(e.to_string()))
    }

    fn clamp(value: f64, extent: u32) -> i32 {
        let max = extent.saturating_sub(1) as f64;
        value.round().clamp(0.0, max) as i32
    }
}

fn axis_info(extent: u32) -> AbsInfo {
    let max = extent.saturating_sub(1).min(i32::MAX as u32) as i32;
    AbsInfo::new(0, 0, max, 0, 0, 1)
}

fn key_value(pressed: bool) -> i32 {
    if pressed {
        PRESSED
    } else {
        RELEASED
    }
}

impl InputSink for UinputInputSink {
    fn notify_key(&self, time: u64, key: u32, action: KeyAction) -> Result<(), InjectionError> {
        let code = u16::try_from(key)
            .map_err(|_| InjectionError::Sink(format!("key code {key} out of range")))?;
        debug!(time, key, ?action, "uinput key");
        self.emit(InputEvent::new(
            EventType::KEY,
            code,
            key_value(action == KeyAction::Down),
        ))
    }

    fn notify_motion_absolute(&self, time: u64, x: f64, y: f64) -> Result<(), InjectionError> {
        debug!(time, x, y, "uinput motion");
        let x = InputEvent::new(
            EventType::ABSOLUTE,
            AbsoluteAxisType::ABS_X.0,
            Self::clamp(x, self.width),
        );
        let y = InputEvent::new(
            EventType::ABSOLUTE,
            AbsoluteAxisType::ABS_Y.0,
            Self::clamp(y, self.height),
        );
        let syn = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(&[x, y, syn])
            .map_err(|e| InjectionError::Sink(e.to_string()))
    }

    fn notify_button(
        &self,
        time: u64,
        button: u32,
        action: ButtonAction,
    ) -> Result<(), InjectionError> {
        let code = u16::try_from(button)
            .map_err(|_| InjectionError::Sink(format!("button code {button} out of range")))?;
        debug!(time, button, ?action, "uinput button");
        self.emit(InputEvent::new(
            EventType::KEY,
            code,
            key_value(action == ButtonAction::Down),
        ))
    }

    fn notify_axis(&self, time: u64, axis: AxisEvent) -> Result<(), InjectionError> {
        debug!(time, ?axis, "uinput axis");
        if axis.discrete == 0 {
            return Ok(());
        }
        let wheel = match axis.axis {
            ScrollAxis::Vertical => RelativeAxisType::REL_WHEEL,
            ScrollAxis::Horizontal => RelativeAxisType::REL_HWHEEL,
        };
        // evdev wheels count up-is-positive; compositor axis values grow downward.
        self.emit(InputEvent::new(EventType::RELATIVE, wheel.0, -axis.discrete))
    }
}
