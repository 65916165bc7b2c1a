//! Plugin session lifecycle
//!
//! `Plugin::init` is what the host's input API init entry point does:
//! identify the game, bring up the analog driver, load the axis table and
//! register one virtual device. The returned `Plugin` is the device context
//! the host calls back into until `shutdown`.

use crate::config::AxisTable;
use crate::error::PluginError;
use crate::host::{
    major_version, make_version, minor_version, Compatibility, DeviceDescriptor, HostInfo, HostLog,
    HostStatus, Registrar,
};
use crate::host_log::{self, with_host_log};
use crate::poll::{AxisDevice, EventFlags, InputEvent};
use keyaxis_device::AnalogDevice;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Dispatch};

/// The only input API version this plugin implements
pub const INPUT_API_VERSION: u32 = make_version(1, 0);

/// What the host passes to plugin initialisation
pub struct InitParams<'a> {
    pub host: HostInfo,
    /// Host log sink; without one, logs go to the default subscriber
    pub log: Option<Arc<dyn HostLog>>,
    /// Axis config to load, defaults are used if it cannot be read
    pub config_path: PathBuf,
    pub registrar: &'a mut dyn Registrar,
}

/// A running plugin session
pub struct Plugin<D: AnalogDevice> {
    device: AxisDevice<D>,
    dispatch: Option<Dispatch>,
    pending_activation: bool,
    shut_down: bool,
}

impl<D: AnalogDevice> Plugin<D> {
    /// Initialise the session
    ///
    /// Fails if the API version is unsupported, the analog driver does not
    /// come up, or the host refuses the device. Config problems and unknown
    /// games are only logged.
    pub fn init(api_version: u32, params: InitParams<'_>, device: D) -> Result<Self, PluginError> {
        if api_version != INPUT_API_VERSION {
            return Err(PluginError::UnsupportedApi {
                major: major_version(api_version),
                minor: minor_version(api_version),
            });
        }

        let dispatch = params.log.clone().map(host_log::dispatch);
        let device = with_host_log(dispatch.as_ref(), || start_session(params, device))?;

        Ok(Self {
            device,
            dispatch,
            pending_activation: true,
            shut_down: false,
        })
    }

    /// Host event callback: see [`AxisDevice::on_input_event`]
    pub fn input_event(&mut self, flags: EventFlags) -> Option<InputEvent> {
        let dispatch = self.dispatch.clone();
        with_host_log(dispatch.as_ref(), || self.device.on_input_event(flags))
    }

    /// Host-shaped event callback returning a status code
    pub fn input_event_callback(&mut self, event: &mut InputEvent, flags: EventFlags) -> HostStatus {
        let dispatch = self.dispatch.clone();
        with_host_log(dispatch.as_ref(), || {
            self.device.input_event_callback(event, flags)
        })
    }

    /// Drain one frame of changes, flagging the first frame after init as
    /// the first after activation
    pub fn poll_frame(&mut self) -> Vec<InputEvent> {
        let after_activation = std::mem::take(&mut self.pending_activation);
        let dispatch = self.dispatch.clone();
        with_host_log(dispatch.as_ref(), || self.device.drain_frame(after_activation))
    }

    pub fn axis_device(&self) -> &AxisDevice<D> {
        &self.device
    }

    /// The analog device, e.g. to feed readings into a simulated one
    pub fn device_mut(&mut self) -> &mut D {
        self.device.device_mut()
    }

    /// End the session, releasing the analog driver and the host log sink
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let dispatch = self.dispatch.take();
        with_host_log(dispatch.as_ref(), || {
            info!("Shutting down, releasing {} device", self.device.device().name());
            self.device.device_mut().uninitialize();
        });
    }
}

impl<D: AnalogDevice> Drop for Plugin<D> {
    fn drop(&mut self) {
        self.release();
    }
}

fn start_session<D: AnalogDevice>(
    params: InitParams<'_>,
    mut device: D,
) -> Result<AxisDevice<D>, PluginError> {
    let host = &params.host;
    info!("Game '{}' {}.{}", host.game_id, host.major(), host.minor());

    match host.compatibility() {
        Compatibility::Supported => {}
        Compatibility::TooOld => {
            warn!("WARNING: Too old version of the game, some features might behave incorrectly")
        }
        Compatibility::TooNewMajor => warn!(
            "WARNING: Too new major version of the game, some features might behave incorrectly"
        ),
        Compatibility::UnknownGame => warn!(
            "WARNING: Unsupported game, some features or values might behave incorrectly"
        ),
    }

    match device.initialize() {
        Ok(count) => info!("{} analog sdk initialised, devices found = {}", device.name(), count),
        Err(e) => {
            error!("{} analog sdk init failure: {}", device.name(), e);
            return Err(e.into());
        }
    }

    let table = AxisTable::load_or_default(&params.config_path);
    let descriptor = DeviceDescriptor::for_table(&table);

    let status = params.registrar.register_device(&descriptor);
    if status != HostStatus::Ok {
        error!("Unable to register device: {}", status);
        device.uninitialize();
        return Err(PluginError::Registration(status));
    }
    info!(
        "Registered device '{}' with {} inputs",
        descriptor.display_name,
        descriptor.inputs.len()
    );

    Ok(AxisDevice::new(table, device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostLogLevel, RecordingRegistrar, GAME_ID_EUT2};
    use keyaxis_device::{AnalogResult, KeyCode, MemoryDevice};
    use parking_lot::Mutex;
    use tempfile::{tempdir, TempDir};

    type Lines = Arc<Mutex<Vec<(HostLogLevel, String)>>>;

    fn sink() -> (Lines, Arc<dyn HostLog>) {
        let lines: Lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let sink = move |level: HostLogLevel, line: &str| {
            captured.lock().push((level, line.to_string()));
        };
        (lines, Arc::new(sink))
    }

    /// Session params pointing at a config file that does not exist in `dir`
    fn params<'a>(
        registrar: &'a mut RecordingRegistrar,
        log: Option<Arc<dyn HostLog>>,
        game: &str,
        dir: &TempDir,
    ) -> InitParams<'a> {
        InitParams {
            host: HostInfo::new(game, make_version(1, 0)),
            log,
            config_path: dir.path().join("keyaxis.cfg"),
            registrar,
        }
    }

    #[test]
    fn test_init_registers_device_with_defaults() {
        let dir = tempdir().unwrap();
        let (lines, log) = sink();
        let mut registrar = RecordingRegistrar::new();
        let plugin = Plugin::init(
            INPUT_API_VERSION,
            params(&mut registrar, Some(log), GAME_ID_EUT2, &dir),
            MemoryDevice::new(),
        )
        .unwrap();

        assert_eq!(plugin.axis_device().table(), &AxisTable::with_defaults());
        assert!(plugin.axis_device().device().is_initialized());
        drop(plugin);

        assert_eq!(registrar.devices().len(), 1);
        assert_eq!(registrar.devices()[0].inputs[1].display_name, "Analog key W");

        let lines = lines.lock();
        assert!(lines[0].1.ends_with("Game 'eut2' 1.0"));
        // Missing config is a warning, not a failure
        assert!(lines
            .iter()
            .any(|(level, line)| *level == HostLogLevel::Warning && line.contains("WASD")));
        assert!(lines.iter().all(|(level, _)| *level != HostLogLevel::Error));
    }

    #[test]
    fn test_unsupported_api_version() {
        let dir = tempdir().unwrap();
        let mut registrar = RecordingRegistrar::new();
        let err = Plugin::init(
            make_version(2, 0),
            params(&mut registrar, None, GAME_ID_EUT2, &dir),
            MemoryDevice::new(),
        )
        .err()
        .unwrap();
        assert_eq!(err.status(), HostStatus::Unsupported);
        assert!(registrar.devices().is_empty());
    }

    #[test]
    fn test_unknown_game_only_warns() {
        let dir = tempdir().unwrap();
        let (lines, log) = sink();
        let mut registrar = RecordingRegistrar::new();
        let plugin = Plugin::init(
            INPUT_API_VERSION,
            params(&mut registrar, Some(log), "farming", &dir),
            MemoryDevice::new(),
        );
        assert!(plugin.is_ok());
        assert!(lines
            .lock()
            .iter()
            .any(|(level, line)| *level == HostLogLevel::Warning && line.contains("Unsupported game")));
    }

    #[test]
    fn test_device_init_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let (lines, log) = sink();
        let mut registrar = RecordingRegistrar::new();
        let err = Plugin::init(
            INPUT_API_VERSION,
            params(&mut registrar, Some(log), GAME_ID_EUT2, &dir),
            MemoryDevice::failing_init(AnalogResult::NoDevices),
        )
        .err()
        .unwrap();

        assert!(matches!(err, PluginError::Device(_)));
        assert_eq!(err.status(), HostStatus::GenericError);
        assert!(registrar.devices().is_empty());
        assert!(lines
            .lock()
            .iter()
            .any(|(level, line)| *level == HostLogLevel::Error && line.contains("-1999")));
    }

    #[test]
    fn test_registration_failure() {
        let dir = tempdir().unwrap();
        let mut registrar = RecordingRegistrar::rejecting(HostStatus::InvalidParameter);
        let err = Plugin::init(
            INPUT_API_VERSION,
            params(&mut registrar, None, GAME_ID_EUT2, &dir),
            MemoryDevice::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            PluginError::Registration(HostStatus::InvalidParameter)
        ));
        assert_eq!(err.status(), HostStatus::GenericError);
    }

    #[test]
    fn test_poll_frame_and_shutdown() {
        let dir = tempdir().unwrap();
        let (lines, log) = sink();
        let mut registrar = RecordingRegistrar::new();
        let mut plugin = Plugin::init(
            INPUT_API_VERSION,
            params(&mut registrar, Some(log), GAME_ID_EUT2, &dir),
            MemoryDevice::new(),
        )
        .unwrap();

        plugin.device_mut().set(KeyCode::W, 0.5);
        let events = plugin.poll_frame();
        assert_eq!(
            events,
            vec![InputEvent {
                input_index: 1,
                value: 0.5
            }]
        );
        assert!(plugin.poll_frame().is_empty());

        let activation_logs = lines
            .lock()
            .iter()
            .filter(|(_, line)| line.contains("First call after activation"))
            .count();
        assert_eq!(activation_logs, 1);

        plugin.shutdown();
        assert!(lines
            .lock()
            .last()
            .is_some_and(|(_, line)| line.contains("Shutting down")));
    }

    #[test]
    fn test_callback_status() {
        let dir = tempdir().unwrap();
        let mut registrar = RecordingRegistrar::new();
        let mut plugin = Plugin::init(
            INPUT_API_VERSION,
            params(&mut registrar, None, GAME_ID_EUT2, &dir),
            MemoryDevice::new(),
        )
        .unwrap();

        let mut event = InputEvent {
            input_index: 0,
            value: 0.0,
        };
        assert_eq!(
            plugin.input_event_callback(&mut event, EventFlags::FIRST_IN_FRAME),
            HostStatus::NotFound
        );
        plugin.device_mut().set(KeyCode::A, 0.4);
        assert_eq!(
            plugin.input_event(EventFlags::FIRST_IN_FRAME),
            Some(InputEvent {
                input_index: 3,
                value: -0.4
            })
        );
    }
}
