//! Frame scripts for the simulator
//!
//! A script drives a [`MemoryDevice`] one frame per line:
//!
//! ```text
//! # throttle in, then steer left
//! W=0.5
//! A=0.3 D=0.3
//! A=0.8
//!
//! D=err        # read failure on D
//! release
//! ```
//!
//! Keys are names or HID usage ids, values are travels in 0.0-1.0 and stay
//! set until changed. `err` makes reads of that key fail, `release` lets go
//! of every key. A blank line is a frame with no input changes; comment-only
//! lines are skipped.

use crate::plugin::Plugin;
use crate::poll::InputEvent;
use keyaxis_device::{AnalogResult, KeyCode, MemoryDevice};
use thiserror::Error;

/// A malformed script line
#[derive(Error, Debug, PartialEq)]
#[error("line {line}: {reason}")]
pub struct ScriptError {
    pub line: usize,
    pub reason: String,
}

/// One change applied before a frame is polled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyUpdate {
    Set(KeyCode, f32),
    Fail(KeyCode),
    ReleaseAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 1-based line number in the script
    pub line: usize,
    pub updates: Vec<KeyUpdate>,
}

/// Events drained for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub line: usize,
    pub events: Vec<InputEvent>,
}

pub fn parse_script(text: &str) -> Result<Vec<Frame>, ScriptError> {
    let mut frames = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let (content, had_comment) = match raw.split_once('#') {
            Some((before, _)) => (before, true),
            None => (raw, false),
        };
        if content.trim().is_empty() && had_comment {
            continue;
        }

        let updates = content
            .split_whitespace()
            .map(|token| parse_token(token).map_err(|reason| ScriptError { line, reason }))
            .collect::<Result<Vec<_>, _>>()?;
        frames.push(Frame { line, updates });
    }
    Ok(frames)
}

fn parse_token(token: &str) -> Result<KeyUpdate, String> {
    if token.eq_ignore_ascii_case("release") {
        return Ok(KeyUpdate::ReleaseAll);
    }

    let (key, value) = token
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{}\"", token))?;
    let key: KeyCode = key.parse().map_err(|e| format!("{}", e))?;

    if value.eq_ignore_ascii_case("err") {
        return Ok(KeyUpdate::Fail(key));
    }
    let travel: f32 = value
        .parse()
        .map_err(|_| format!("invalid travel \"{}\" for key {}", value, key))?;
    if !(0.0..=1.0).contains(&travel) {
        return Err(format!("travel {} for key {} is outside 0.0-1.0", travel, key));
    }
    Ok(KeyUpdate::Set(key, travel))
}

/// Apply a frame's updates to the device
pub fn apply(frame: &Frame, device: &mut MemoryDevice) {
    for update in &frame.updates {
        match *update {
            KeyUpdate::Set(key, travel) => device.set(key, travel),
            KeyUpdate::Fail(key) => device.fail_key(key, AnalogResult::DeviceDisconnected),
            KeyUpdate::ReleaseAll => device.release_all(),
        }
    }
}

/// Play every frame through the plugin and collect what the host would see
pub fn run_script(plugin: &mut Plugin<MemoryDevice>, frames: &[Frame]) -> Vec<FrameReport> {
    frames
        .iter()
        .map(|frame| {
            apply(frame, plugin.device_mut());
            FrameReport {
                line: frame.line,
                events: plugin.poll_frame(),
            }
        })
        .collect()
}
