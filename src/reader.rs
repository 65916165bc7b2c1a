//! Key reads with error degradation

use keyaxis_device::{AnalogDevice, AnalogResult, KeyCode};
use tracing::error;

/// Reads key travel from a device, turning driver errors into "not pressed"
pub struct KeyReader<'a, D: ?Sized> {
    device: &'a mut D,
}

impl<'a, D: AnalogDevice + ?Sized> KeyReader<'a, D> {
    pub fn new(device: &'a mut D) -> Self {
        Self { device }
    }

    /// Current travel of `key` in 0.0..=1.0
    ///
    /// A negative (or NaN) driver result is logged and read as 0.0. There
    /// is no retry; the next poll reads again.
    pub fn read(&mut self, key: KeyCode) -> f32 {
        let value = self.device.read_analog(key);
        if value >= 0.0 {
            return value;
        }

        match AnalogResult::from_reading(value) {
            Some(result) => error!(
                "failure reading analog key {}, error code = {} ({})",
                key, value, result
            ),
            None => error!("failure reading analog key {}, error code = {}", key, value),
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostLog, HostLogLevel};
    use crate::host_log::HostLogLayer;
    use keyaxis_device::MemoryDevice;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Default)]
    struct Capture(Mutex<Vec<(HostLogLevel, String)>>);

    impl HostLog for Capture {
        fn log(&self, level: HostLogLevel, line: &str) {
            self.0.lock().push((level, line.to_string()));
        }
    }

    fn device() -> MemoryDevice {
        let mut dev = MemoryDevice::new();
        dev.initialize().unwrap();
        dev
    }

    #[test]
    fn test_valid_reading_passes_through() {
        let mut dev = device();
        dev.set(KeyCode::W, 0.42);
        let mut reader = KeyReader::new(&mut dev);
        assert_eq!(reader.read(KeyCode::W), 0.42);
        assert_eq!(reader.read(KeyCode::S), 0.0);
    }

    #[test]
    fn test_error_reads_as_zero_and_logs() {
        let capture = Arc::new(Capture::default());
        let subscriber =
            tracing_subscriber::registry().with(HostLogLayer::new(capture.clone()));

        let mut dev = device();
        dev.fail_key(KeyCode::A, AnalogResult::DeviceDisconnected);

        let value = tracing::subscriber::with_default(subscriber, || {
            KeyReader::new(&mut dev).read(KeyCode::A)
        });
        assert_eq!(value, 0.0);

        let lines = capture.0.lock();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, HostLogLevel::Error);
        assert!(lines[0].1.contains("-1998"));
        assert!(lines[0].1.contains("device disconnected"));
    }

    #[test]
    fn test_uninitialised_device_reads_zero() {
        let mut dev = MemoryDevice::new();
        dev.set(KeyCode::W, 0.9);
        assert_eq!(KeyReader::new(&mut dev).read(KeyCode::W), 0.0);
    }

    #[test]
    fn test_nan_reads_as_zero() {
        let mut dev = device();
        dev.set(KeyCode::W, f32::NAN);
        assert_eq!(KeyReader::new(&mut dev).read(KeyCode::W), 0.0);
    }
}
