//! In-process analog device
//!
//! Holds key travels set by the caller. Used by the `simulate` command and
//! by tests in place of real hardware.

use crate::error::{AnalogResult, DeviceError};
use crate::keycode::KeyCode;
use crate::AnalogDevice;
use std::collections::HashMap;
use tracing::debug;

/// Analog device backed by a key → travel map
#[derive(Debug)]
pub struct MemoryDevice {
    readings: HashMap<KeyCode, f32>,
    device_count: usize,
    init_error: Option<i32>,
    initialized: bool,
    reads: usize,
}

impl MemoryDevice {
    /// Create a device that reports one connected keyboard
    pub fn new() -> Self {
        Self {
            readings: HashMap::new(),
            device_count: 1,
            init_error: None,
            initialized: false,
            reads: 0,
        }
    }

    /// Create a device whose initialisation fails with `code`
    pub fn failing_init(code: AnalogResult) -> Self {
        Self {
            init_error: Some(code.code()),
            ..Self::new()
        }
    }

    /// Set the travel of a key (0.0-1.0)
    pub fn set(&mut self, key: KeyCode, travel: f32) {
        self.readings.insert(key, travel);
    }

    /// Make reads of `key` fail with `result` until it is set again
    pub fn fail_key(&mut self, key: KeyCode, result: AnalogResult) {
        self.readings.insert(key, result.as_reading());
    }

    /// Release every key
    pub fn release_all(&mut self) {
        self.readings.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total number of `read_analog` calls so far
    pub fn read_count(&self) -> usize {
        self.reads
    }
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogDevice for MemoryDevice {
    fn initialize(&mut self) -> Result<usize, DeviceError> {
        if let Some(code) = self.init_error {
            return Err(DeviceError::InitFailed { code });
        }
        self.initialized = true;
        debug!("Memory device initialised");
        Ok(self.device_count)
    }

    fn read_analog(&mut self, key: KeyCode) -> f32 {
        self.reads += 1;
        if !self.initialized {
            return AnalogResult::UnInitialized.as_reading();
        }
        self.readings.get(&key).copied().unwrap_or(0.0)
    }

    fn uninitialize(&mut self) {
        self.initialized = false;
    }

    fn name(&self) -> &str {
        "memory"
    }
}
