//! Analog keyboard to virtual joystick axes
//!
//! Maps analog key travel (0.0-1.0 per key) onto six joystick axes and hands
//! changed axes to a polling host one at a time.
//!
//! # Modules
//! - `config`: the axis table and its file formats
//! - `combiner`: single and dual key axis values
//! - `scanner`: first-change detection across the table
//! - `poll`: the host event callback protocol
//! - `plugin`: session init/shutdown against a host
//! - `uinput`: a Linux host exposing the axes as an evdev joystick

pub mod combiner;
pub mod config;
pub mod error;
pub mod host;
pub mod host_log;
pub mod plugin;
pub mod poll;
pub mod reader;
pub mod scanner;
pub mod simulate;
pub mod state;

#[cfg(all(feature = "uinput", target_os = "linux"))]
pub mod uinput;

pub use config::{AxisBinding, AxisDefinition, AxisKind, AxisTable, AXIS_COUNT};
pub use error::{ConfigError, PluginError};
pub use host::{DeviceDescriptor, HostInfo, HostLog, HostLogLevel, HostStatus, Registrar};
pub use plugin::{InitParams, Plugin, INPUT_API_VERSION};
pub use poll::{AxisDevice, EventFlags, InputEvent};
pub use state::DeviceState;

pub use keyaxis_device::{AnalogDevice, KeyCode, MemoryDevice};
