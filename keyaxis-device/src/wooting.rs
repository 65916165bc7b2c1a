//! Wooting analog SDK backend
//!
//! Links against `libwooting_analog_wrapper`, which loads the SDK plugins
//! at runtime. Key codes are HID usage ids (the SDK's default keycode mode).

use crate::error::{describe_code, DeviceError};
use crate::keycode::KeyCode;
use crate::AnalogDevice;
use std::os::raw::{c_float, c_int, c_ushort};
use tracing::{debug, info};

#[link(name = "wooting_analog_wrapper")]
extern "C" {
    fn wooting_analog_initialise() -> c_int;
    fn wooting_analog_uninitialise() -> c_int;
    fn wooting_analog_read_analog(code: c_ushort) -> c_float;
}

/// Analog keyboards reached through the Wooting SDK
#[derive(Debug, Default)]
pub struct WootingDevice {
    initialized: bool,
}

impl WootingDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalogDevice for WootingDevice {
    fn initialize(&mut self) -> Result<usize, DeviceError> {
        // SAFETY: takes no arguments; the SDK handles repeated initialisation
        let result = unsafe { wooting_analog_initialise() };
        if result < 0 {
            debug!("Wooting SDK init returned {} ({})", result, describe_code(result));
            return Err(DeviceError::InitFailed { code: result });
        }
        self.initialized = true;
        info!("Wooting analog SDK initialised, {} device(s)", result);
        Ok(result as usize)
    }

    fn read_analog(&mut self, key: KeyCode) -> f32 {
        // SAFETY: plain value call; errors come back as negative readings
        unsafe { wooting_analog_read_analog(key.0) }
    }

    fn uninitialize(&mut self) {
        if !self.initialized {
            return;
        }
        // SAFETY: only reached after a successful initialise
        let result = unsafe { wooting_analog_uninitialise() };
        debug!("Wooting SDK uninitialised ({})", describe_code(result));
        self.initialized = false;
    }

    fn name(&self) -> &str {
        "wooting"
    }
}

impl Drop for WootingDevice {
    fn drop(&mut self) {
        self.uninitialize();
    }
}
