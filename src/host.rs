//! Host application interface
//!
//! Models what a game's input plugin API hands to the plugin: version and
//! game identification, a log sink, and device registration. Status codes
//! follow the SCS input SDK numbering.

use crate::config::AxisTable;
use std::fmt;

/// Status returned across the host boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostStatus {
    Ok,
    Unsupported,
    InvalidParameter,
    AlreadyRegistered,
    /// No (more) input events this frame
    NotFound,
    GenericError,
}

impl HostStatus {
    /// Numeric code as the host expects it
    pub fn code(self) -> i32 {
        match self {
            HostStatus::Ok => 0,
            HostStatus::Unsupported => -1,
            HostStatus::InvalidParameter => -2,
            HostStatus::AlreadyRegistered => -3,
            HostStatus::NotFound => -4,
            HostStatus::GenericError => -7,
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostStatus::Ok => "ok",
            HostStatus::Unsupported => "unsupported",
            HostStatus::InvalidParameter => "invalid parameter",
            HostStatus::AlreadyRegistered => "already registered",
            HostStatus::NotFound => "not found",
            HostStatus::GenericError => "generic error",
        };
        write!(f, "{} ({})", s, self.code())
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Severity levels the host log understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostLogLevel {
    Message,
    Warning,
    Error,
}

impl fmt::Display for HostLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostLogLevel::Message => "message",
            HostLogLevel::Warning => "warning",
            HostLogLevel::Error => "error",
        })
    }
}

/// The host's log sink
pub trait HostLog: Send + Sync {
    fn log(&self, level: HostLogLevel, line: &str);
}

impl<F> HostLog for F
where
    F: Fn(HostLogLevel, &str) + Send + Sync,
{
    fn log(&self, level: HostLogLevel, line: &str) {
        self(level, line)
    }
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Pack a `major.minor` version the way the host does
pub const fn make_version(major: u32, minor: u32) -> u32 {
    (major << 16) | (minor & 0xFFFF)
}

pub const fn major_version(version: u32) -> u32 {
    (version >> 16) & 0xFFFF
}

pub const fn minor_version(version: u32) -> u32 {
    version & 0xFFFF
}

/// Euro Truck Simulator 2
pub const GAME_ID_EUT2: &str = "eut2";
/// American Truck Simulator
pub const GAME_ID_ATS: &str = "ats";

/// Oldest game input API version the mapping was written against
pub const MINIMAL_GAME_VERSION: u32 = make_version(1, 0);
/// Newest game input API version known to work
pub const IMPLEMENTED_GAME_VERSION: u32 = make_version(1, 0);

/// The running host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub game_id: String,
    pub game_version: u32,
}

/// Outcome of checking the host application against what we support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Supported,
    /// Below the minimal version, some features may be missing
    TooOld,
    /// Newer major version, values may be incompatible
    TooNewMajor,
    /// Not a game this plugin knows
    UnknownGame,
}

impl HostInfo {
    pub fn new(game_id: &str, game_version: u32) -> Self {
        Self {
            game_id: game_id.to_string(),
            game_version,
        }
    }

    pub fn major(&self) -> u32 {
        major_version(self.game_version)
    }

    pub fn minor(&self) -> u32 {
        minor_version(self.game_version)
    }

    /// Compatibility is advisory: every outcome still runs
    pub fn compatibility(&self) -> Compatibility {
        if self.game_id != GAME_ID_EUT2 && self.game_id != GAME_ID_ATS {
            return Compatibility::UnknownGame;
        }
        if self.game_version < MINIMAL_GAME_VERSION {
            return Compatibility::TooOld;
        }
        // Future versions are fine as long the major version is not changed
        if self.major() > major_version(IMPLEMENTED_GAME_VERSION) {
            return Compatibility::TooNewMajor;
        }
        Compatibility::Supported
    }
}

// ---------------------------------------------------------------------------
// Device registration
// ---------------------------------------------------------------------------

/// Value type of an input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Float,
}

/// One input channel of a registered device
#[derive(Debug, Clone, PartialEq)]
pub struct InputDescriptor {
    /// Stable identifier used in the host's control bindings
    pub name: String,
    /// Name shown to the player
    pub display_name: String,
    pub value_type: ValueType,
}

/// A virtual device as presented to the host
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub display_name: String,
    pub inputs: Vec<InputDescriptor>,
}

/// Identifier of the registered device
pub const DEVICE_NAME: &str = "keyaxis";
/// Display name of the registered device
pub const DEVICE_DISPLAY_NAME: &str = "Analog Keyboard Device";

impl DeviceDescriptor {
    /// One float input per axis slot, `axis1`..`axis6`, display-named from
    /// the table
    pub fn for_table(table: &AxisTable) -> Self {
        let inputs = table
            .iter()
            .enumerate()
            .map(|(index, axis)| InputDescriptor {
                name: format!("axis{}", index + 1),
                display_name: axis.display_name.clone(),
                value_type: ValueType::Float,
            })
            .collect();

        Self {
            name: DEVICE_NAME.to_string(),
            display_name: DEVICE_DISPLAY_NAME.to_string(),
            inputs,
        }
    }
}

/// Accepts device registrations from the plugin
pub trait Registrar {
    fn register_device(&mut self, device: &DeviceDescriptor) -> HostStatus;
}

/// Registrar that keeps what it was given
///
/// Used by the simulator and in tests; rejects a second device with the
/// same name like a real host would.
#[derive(Debug, Default)]
pub struct RecordingRegistrar {
    devices: Vec<DeviceDescriptor>,
    reject_with: Option<HostStatus>,
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registrar that refuses every device with `status`
    pub fn rejecting(status: HostStatus) -> Self {
        Self {
            devices: Vec::new(),
            reject_with: Some(status),
        }
    }

    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }
}

impl Registrar for RecordingRegistrar {
    fn register_device(&mut self, device: &DeviceDescriptor) -> HostStatus {
        if let Some(status) = self.reject_with {
            return status;
        }
        if self.devices.iter().any(|d| d.name == device.name) {
            return HostStatus::AlreadyRegistered;
        }
        self.devices.push(device.clone());
        HostStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_packing() {
        let v = make_version(1, 18);
        assert_eq!(v, 0x0001_0012);
        assert_eq!(major_version(v), 1);
        assert_eq!(minor_version(v), 18);
    }

    #[test]
    fn test_compatibility() {
        assert_eq!(
            HostInfo::new(GAME_ID_EUT2, make_version(1, 0)).compatibility(),
            Compatibility::Supported
        );
        // Newer minor versions are fine
        assert_eq!(
            HostInfo::new(GAME_ID_ATS, make_version(1, 7)).compatibility(),
            Compatibility::Supported
        );
        assert_eq!(
            HostInfo::new(GAME_ID_ATS, make_version(0, 9)).compatibility(),
            Compatibility::TooOld
        );
        assert_eq!(
            HostInfo::new(GAME_ID_EUT2, make_version(2, 0)).compatibility(),
            Compatibility::TooNewMajor
        );
        assert_eq!(
            HostInfo::new("rally", make_version(1, 0)).compatibility(),
            Compatibility::UnknownGame
        );
    }

    #[test]
    fn test_descriptor_from_table() {
        let desc = DeviceDescriptor::for_table(&AxisTable::with_defaults());
        assert_eq!(desc.name, DEVICE_NAME);
        assert_eq!(desc.inputs.len(), crate::config::AXIS_COUNT);
        assert_eq!(desc.inputs[0].name, "axis1");
        assert_eq!(desc.inputs[0].display_name, "unnamed axis");
        assert_eq!(desc.inputs[3].display_name, "Analog key AD");
        assert!(desc.inputs.iter().all(|i| i.value_type == ValueType::Float));
    }

    #[test]
    fn test_recording_registrar() {
        let desc = DeviceDescriptor::for_table(&AxisTable::new());
        let mut registrar = RecordingRegistrar::new();
        assert_eq!(registrar.register_device(&desc), HostStatus::Ok);
        assert_eq!(
            registrar.register_device(&desc),
            HostStatus::AlreadyRegistered
        );
        assert_eq!(registrar.devices().len(), 1);

        let mut rejecting = RecordingRegistrar::rejecting(HostStatus::GenericError);
        assert_eq!(rejecting.register_device(&desc), HostStatus::GenericError);
        assert!(rejecting.devices().is_empty());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HostStatus::Ok.code(), 0);
        assert_eq!(HostStatus::NotFound.code(), -4);
        assert_eq!(HostStatus::GenericError.to_string(), "generic error (-7)");
    }
}
