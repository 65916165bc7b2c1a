//! Virtual joystick host using evdev/uinput
//!
//! Stands in for a game on Linux: registering the plugin's device creates a
//! uinput joystick with one absolute axis per input, and drained events are
//! emitted as `ABS_*` updates.

use crate::host::{DeviceDescriptor, HostStatus, Registrar};
use crate::poll::InputEvent;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, Key, UinputAbsSetup,
};
use thiserror::Error;
use tracing::{error, info};

/// Joystick axis value range (standard for most games)
pub const AXIS_MIN: i32 = -32767;
pub const AXIS_MAX: i32 = 32767;

/// evdev axes in input slot order
const AXIS_CODES: [AbsoluteAxisType; 6] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_Z,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
    AbsoluteAxisType::ABS_RZ,
];

/// Errors from virtual joystick operations
#[derive(Debug, Error)]
pub enum JoystickError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),
    #[error("Failed to emit event: {0}")]
    EmitEvent(#[source] std::io::Error),
    #[error("Device not registered")]
    NotRegistered,
}

/// Host that exposes the registered device as a uinput joystick
#[derive(Default)]
pub struct UinputHost {
    device: Option<VirtualDevice>,
    axis_count: usize,
}

impl UinputHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(descriptor: &DeviceDescriptor) -> Result<VirtualDevice, JoystickError> {
        let mut builder = VirtualDeviceBuilder::new()
            .map_err(JoystickError::CreateDevice)?
            .name(&descriptor.display_name);

        // udev only tags devices with at least one button as joysticks
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_SOUTH);
        builder = builder
            .with_keys(&keys)
            .map_err(JoystickError::CreateDevice)?;

        for code in AXIS_CODES.iter().take(descriptor.inputs.len()) {
            let abs_setup = UinputAbsSetup::new(*code, AbsInfo::new(0, AXIS_MIN, AXIS_MAX, 0, 0, 1));
            builder = builder
                .with_absolute_axis(&abs_setup)
                .map_err(JoystickError::CreateDevice)?;
        }

        builder.build().map_err(JoystickError::CreateDevice)
    }

    /// Emit drained events as axis updates
    pub fn apply(&mut self, events: &[InputEvent]) -> Result<(), JoystickError> {
        let device = self.device.as_mut().ok_or(JoystickError::NotRegistered)?;

        let updates: Vec<_> = events
            .iter()
            .filter(|e| e.input_index < self.axis_count)
            .map(|e| {
                evdev::InputEvent::new_now(
                    evdev::EventType::ABSOLUTE,
                    AXIS_CODES[e.input_index].0,
                    scale_axis(e.value),
                )
            })
            .collect();

        if !updates.is_empty() {
            device.emit(&updates).map_err(JoystickError::EmitEvent)?;
        }
        Ok(())
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .as_mut()?
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

impl Registrar for UinputHost {
    fn register_device(&mut self, descriptor: &DeviceDescriptor) -> HostStatus {
        if self.device.is_some() {
            return HostStatus::AlreadyRegistered;
        }
        if descriptor.inputs.len() > AXIS_CODES.len() {
            error!(
                "Device '{}' has {} inputs, at most {} axes are supported",
                descriptor.name,
                descriptor.inputs.len(),
                AXIS_CODES.len()
            );
            return HostStatus::InvalidParameter;
        }

        match Self::create(descriptor) {
            Ok(device) => {
                info!("Created virtual joystick: {}", descriptor.display_name);
                self.axis_count = descriptor.inputs.len();
                self.device = Some(device);
                HostStatus::Ok
            }
            Err(e) => {
                error!("{}", e);
                HostStatus::GenericError
            }
        }
    }
}

/// Scale an axis value (-1.0..=1.0) to the joystick range
pub fn scale_axis(value: f32) -> i32 {
    (value.clamp(-1.0, 1.0) * AXIS_MAX as f32).round() as i32
}
