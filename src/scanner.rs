//! Change detection across the axis table
//!
//! Each scan walks the axes in index order and stops at the first one whose
//! value differs from what the host was last told. Later changes are left
//! for the next scan, so one scan reports at most one axis.

use crate::combiner::combine;
use crate::config::{AxisBinding, AxisDefinition, AxisTable};
use crate::reader::KeyReader;
use crate::state::DeviceState;
use keyaxis_device::AnalogDevice;
use tracing::trace;

/// Current value of one axis. Disabled axes are not read.
pub fn axis_value<D: AnalogDevice + ?Sized>(
    axis: &AxisDefinition,
    reader: &mut KeyReader<'_, D>,
) -> f32 {
    match axis.binding {
        AxisBinding::Disabled => 0.0,
        AxisBinding::Single(key) => combine(axis.kind(), reader.read(key), 0.0),
        AxisBinding::Dual { negative, positive } => {
            let negative = reader.read(negative);
            let positive = reader.read(positive);
            combine(axis.kind(), negative, positive)
        }
    }
}

/// Find the lowest-index axis whose value changed and record it
///
/// # Returns
/// The changed index, or `None` when every axis matches `state`
#[allow(clippy::float_cmp)]
pub fn next_change<D: AnalogDevice + ?Sized>(
    table: &AxisTable,
    state: &mut DeviceState,
    reader: &mut KeyReader<'_, D>,
) -> Option<usize> {
    for (index, axis) in table.iter().enumerate() {
        let value = axis_value(axis, reader);
        if value != state.last_value(index) {
            trace!("axis {} changed to {}", index, value);
            state.record(index, value);
            return Some(index);
        }
    }
    None
}
