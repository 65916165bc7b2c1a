//! Last-reported axis values for one registered device

use crate::config::AXIS_COUNT;

/// What the host was last told about each axis
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    last_values: [f32; AXIS_COUNT],
    last_index: usize,
}

impl DeviceState {
    /// All axes at rest (0.0), nothing reported yet
    pub fn new() -> Self {
        Self {
            last_values: [0.0; AXIS_COUNT],
            last_index: 0,
        }
    }

    /// Value last reported for `index`
    pub fn last_value(&self, index: usize) -> f32 {
        self.last_values[index]
    }

    pub fn last_values(&self) -> &[f32; AXIS_COUNT] {
        &self.last_values
    }

    /// Index of the most recent change
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    /// The most recent change as `(index, value)`
    pub fn last_event(&self) -> (usize, f32) {
        (self.last_index, self.last_values[self.last_index])
    }

    /// Record a detected change. Only the change scanner calls this.
    pub(crate) fn record(&mut self, index: usize, value: f32) {
        self.last_index = index;
        self.last_values[index] = value;
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
