//! Host polling protocol
//!
//! The host calls the device's event callback repeatedly until it answers
//! "not found". Each call that starts a frame runs one change scan; the
//! reported event is always the change stored by the most recent scan.

use crate::config::{AxisTable, AXIS_COUNT};
use crate::host::HostStatus;
use crate::reader::KeyReader;
use crate::scanner;
use crate::state::DeviceState;
use bitflags::bitflags;
use keyaxis_device::AnalogDevice;
use tracing::info;

bitflags! {
    /// Flags passed by the host with each event callback
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventFlags: u32 {
        /// First call of the current input frame
        const FIRST_IN_FRAME         = 0x0000_0001;

        /// First call since the device was (re)activated
        const FIRST_AFTER_ACTIVATION = 0x0000_0002;
    }
}

/// One axis value handed to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    /// Axis slot, 0..AXIS_COUNT
    pub input_index: usize,
    pub value: f32,
}

/// The per-device context the host calls back into
///
/// Owns the axis table, the last-reported state and the analog device.
/// One instance exists per registered virtual device.
#[derive(Debug)]
pub struct AxisDevice<D: AnalogDevice> {
    table: AxisTable,
    state: DeviceState,
    device: D,
}

impl<D: AnalogDevice> AxisDevice<D> {
    pub fn new(table: AxisTable, device: D) -> Self {
        Self {
            table,
            state: DeviceState::new(),
            device,
        }
    }

    /// Answer one host event callback
    ///
    /// # Returns
    /// The event to report, or `None` ("not found") when a new frame found
    /// nothing changed
    pub fn on_input_event(&mut self, flags: EventFlags) -> Option<InputEvent> {
        if flags.contains(EventFlags::FIRST_AFTER_ACTIVATION) {
            info!("First call after activation");
        }

        if flags.contains(EventFlags::FIRST_IN_FRAME) {
            let mut reader = KeyReader::new(&mut self.device);
            scanner::next_change(&self.table, &mut self.state, &mut reader)?;
        }

        let (input_index, value) = self.state.last_event();
        Some(InputEvent { input_index, value })
    }

    /// Host-shaped wrapper around [`AxisDevice::on_input_event`]: fills
    /// `event` and returns a status code
    pub fn input_event_callback(&mut self, event: &mut InputEvent, flags: EventFlags) -> HostStatus {
        match self.on_input_event(flags) {
            Some(found) => {
                *event = found;
                HostStatus::Ok
            }
            None => HostStatus::NotFound,
        }
    }

    /// Drain every pending change for one frame
    ///
    /// This is the loop the in-crate hosts (simulator, uinput) run, not the
    /// host contract itself. A game host sets `FIRST_IN_FRAME` on the first
    /// call only, and follow-up calls repeat the stored event without
    /// scanning (see [`AxisDevice::on_input_event`]). Here every call is
    /// issued as a frame start, so each one rescans and picks up the next
    /// changed axis. The loop stops at the first "not found" and is capped
    /// at one call per axis, so keys moving mid-drain cannot keep the frame
    /// open.
    pub fn drain_frame(&mut self, after_activation: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let mut flags = EventFlags::FIRST_IN_FRAME;
        if after_activation {
            flags |= EventFlags::FIRST_AFTER_ACTIVATION;
        }

        for _ in 0..AXIS_COUNT {
            match self.on_input_event(flags) {
                Some(event) => events.push(event),
                None => break,
            }
            flags.remove(EventFlags::FIRST_AFTER_ACTIVATION);
        }
        events
    }

    pub fn table(&self) -> &AxisTable {
        &self.table
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyaxis_device::{KeyCode, MemoryDevice};

    fn axis_device() -> AxisDevice<MemoryDevice> {
        let mut dev = MemoryDevice::new();
        dev.initialize().unwrap();
        AxisDevice::new(AxisTable::with_defaults(), dev)
    }

    #[test]
    fn test_quiet_frame_is_not_found() {
        let mut ad = axis_device();
        assert_eq!(ad.on_input_event(EventFlags::FIRST_IN_FRAME), None);

        let mut event = InputEvent {
            input_index: 0,
            value: 0.0,
        };
        assert_eq!(
            ad.input_event_callback(&mut event, EventFlags::FIRST_IN_FRAME),
            HostStatus::NotFound
        );
    }

    #[test]
    fn test_frame_start_reports_change() {
        let mut ad = axis_device();
        ad.device_mut().set(KeyCode::S, 0.75);

        let mut event = InputEvent {
            input_index: 0,
            value: 0.0,
        };
        let status = ad.input_event_callback(
            &mut event,
            EventFlags::FIRST_IN_FRAME | EventFlags::FIRST_AFTER_ACTIVATION,
        );
        assert_eq!(status, HostStatus::Ok);
        assert_eq!(
            event,
            InputEvent {
                input_index: 2,
                value: 0.75
            }
        );
    }

    #[test]
    fn test_follow_up_call_repeats_stored_event() {
        let mut ad = axis_device();
        ad.device_mut().set(KeyCode::W, 0.5);
        ad.device_mut().set(KeyCode::S, 0.25);

        let first = ad.on_input_event(EventFlags::FIRST_IN_FRAME);
        assert_eq!(
            first,
            Some(InputEvent {
                input_index: 1,
                value: 0.5
            })
        );
        // Without the frame flag there is no scan, axis 2 stays pending
        let reads = ad.device().read_count();
        assert_eq!(ad.on_input_event(EventFlags::empty()), first);
        assert_eq!(ad.device().read_count(), reads);
    }

    #[test]
    fn test_drain_frame() {
        let mut ad = axis_device();
        ad.device_mut().set(KeyCode::W, 0.5);
        ad.device_mut().set(KeyCode::A, 0.2);
        ad.device_mut().set(KeyCode::D, 0.9);

        let events = ad.drain_frame(true);
        assert_eq!(
            events,
            vec![
                InputEvent {
                    input_index: 1,
                    value: 0.5
                },
                InputEvent {
                    input_index: 3,
                    value: 0.9
                },
            ]
        );
        assert!(ad.drain_frame(false).is_empty());
        assert_eq!(ad.state().last_values(), &[0.0, 0.5, 0.0, 0.9, 0.0, 0.0]);
    }

    #[test]
    fn test_drain_rescans_where_host_calls_repeat() {
        let mut ad = axis_device();
        ad.device_mut().set(KeyCode::W, 0.5);
        ad.device_mut().set(KeyCode::S, 0.25);

        // Host contract: only the first call scans, the rest repeat it
        let first = ad.on_input_event(EventFlags::FIRST_IN_FRAME);
        assert_eq!(ad.on_input_event(EventFlags::empty()), first);
        assert_eq!(ad.on_input_event(EventFlags::empty()), first);

        // The in-crate drain rescans on every call and reaches axis 2
        assert_eq!(
            ad.drain_frame(false),
            vec![InputEvent {
                input_index: 2,
                value: 0.25
            }]
        );
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(EventFlags::FIRST_IN_FRAME.bits(), 1);
        assert_eq!(EventFlags::FIRST_AFTER_ACTIVATION.bits(), 2);
        assert_eq!(
            EventFlags::from_bits_truncate(0xFF),
            EventFlags::FIRST_IN_FRAME | EventFlags::FIRST_AFTER_ACTIVATION
        );
    }
}
