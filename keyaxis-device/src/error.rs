//! Device error types

use std::fmt;
use thiserror::Error;

/// Errors that can occur while bringing up an analog device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Analog SDK initialisation failed, error code = {code}")]
    InitFailed { code: i32 },
}

/// Status codes reported by analog drivers
///
/// Values match the Wooting analog SDK `WootingAnalogResult`. Read calls
/// return these as negative floats in place of a key travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AnalogResult {
    Ok = 1,
    UnInitialized = -2000,
    NoDevices = -1999,
    DeviceDisconnected = -1998,
    Failure = -1997,
    InvalidArgument = -1996,
    NoPlugins = -1995,
    FunctionNotFound = -1994,
    NoMapping = -1993,
    NotAvailable = -1992,
    IncompatibleVersion = -1991,
    DllNotFound = -1990,
}

impl AnalogResult {
    /// Look up a raw status code
    pub fn from_code(code: i32) -> Option<Self> {
        let result = match code {
            1 => Self::Ok,
            -2000 => Self::UnInitialized,
            -1999 => Self::NoDevices,
            -1998 => Self::DeviceDisconnected,
            -1997 => Self::Failure,
            -1996 => Self::InvalidArgument,
            -1995 => Self::NoPlugins,
            -1994 => Self::FunctionNotFound,
            -1993 => Self::NoMapping,
            -1992 => Self::NotAvailable,
            -1991 => Self::IncompatibleVersion,
            -1990 => Self::DllNotFound,
            _ => return None,
        };
        Some(result)
    }

    /// Interpret a key reading. `None` for a valid (non-negative) travel.
    pub fn from_reading(value: f32) -> Option<Self> {
        if value >= 0.0 {
            return None;
        }
        Self::from_code(value as i32)
    }

    /// Raw status code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// The code as a sentinel reading, as drivers report it from read calls
    pub fn as_reading(self) -> f32 {
        self.code() as f32
    }
}

impl fmt::Display for AnalogResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::UnInitialized => "SDK not initialised",
            Self::NoDevices => "no devices connected",
            Self::DeviceDisconnected => "device disconnected",
            Self::Failure => "generic failure",
            Self::InvalidArgument => "invalid argument",
            Self::NoPlugins => "no SDK plugins found",
            Self::FunctionNotFound => "function not found",
            Self::NoMapping => "no keycode mapping",
            Self::NotAvailable => "not available",
            Self::IncompatibleVersion => "incompatible version",
            Self::DllNotFound => "SDK library not found",
        };
        f.write_str(s)
    }
}

/// Human-readable description of a raw status code
pub fn describe_code(code: i32) -> String {
    match AnalogResult::from_code(code) {
        Some(result) => result.to_string(),
        None => "unknown".to_string(),
    }
}
