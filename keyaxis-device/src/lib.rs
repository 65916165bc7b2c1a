//! Analog key device abstraction for keyaxis
//!
//! This crate provides the driver contract the axis mapper reads from:
//!
//! - [`AnalogDevice`] - initialise / read one key / uninitialise
//! - [`MemoryDevice`] - in-process device for simulation and tests
//! - `WootingDevice` - the Wooting analog SDK (behind the `wooting` feature)
//!
//! Readings are normalized key travel in `0.0..=1.0`. A negative reading is
//! an error code from the driver, see [`AnalogResult`].

pub mod error;
pub mod keycode;
pub mod memory;

#[cfg(feature = "wooting")]
pub mod wooting;

pub use error::{AnalogResult, DeviceError};
pub use keycode::KeyCode;
pub use memory::MemoryDevice;

#[cfg(feature = "wooting")]
pub use wooting::WootingDevice;

/// The driver contract - all analog backends implement this
///
/// Calls happen on the host's input thread only, so implementations are
/// free to keep plain mutable state.
pub trait AnalogDevice {
    /// Bring up the driver
    ///
    /// # Returns
    /// Number of analog devices connected (may be 0)
    fn initialize(&mut self) -> Result<usize, DeviceError>;

    /// Read the current travel of one key
    ///
    /// # Returns
    /// Travel in `0.0..=1.0`, or a negative [`AnalogResult`] code on failure
    fn read_analog(&mut self, key: KeyCode) -> f32;

    /// Release the driver. Must be safe to call when not initialized.
    fn uninitialize(&mut self);

    /// Backend name used in log lines
    fn name(&self) -> &str;
}

impl<D: AnalogDevice + ?Sized> AnalogDevice for Box<D> {
    fn initialize(&mut self) -> Result<usize, DeviceError> {
        (**self).initialize()
    }

    fn read_analog(&mut self, key: KeyCode) -> f32 {
        (**self).read_analog(key)
    }

    fn uninitialize(&mut self) {
        (**self).uninitialize()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
