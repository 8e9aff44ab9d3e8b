//! FILENAME: group-engine/src/window.rs
//! Moving Averages - Windowed statistics derived from the group engine.
//!
//! This module computes per-index moving averages over a frame. Each index
//! owns a sub-range of the frame decided by the window type; the sub-range
//! is sliced out and pushed through the group pipeline with a single
//! average calculation, and indices whose window would fall off either
//! edge emit None instead.
//!
//! Algorithm:
//! 1. Compute the inclusive validity bounds for the window type
//! 2. Build the single-average specification once
//! 3. For each valid index, slice the window sub-range out of the frame
//! 4. Group the slice (one bucket) and read the average back out
//! 5. Emit None for every index outside the bounds

use frame::{DataValue, Frame};
use log::debug;

use crate::definition::{
    AggregateOp, CalcParam, CalculationNode, GroupSpec, MovingAverageOptions, WindowType,
};
use crate::engine::group_with_spec;

/// Output key the per-window average is written under.
const WINDOW_RESULT_KEY: &str = "avg";

// ============================================================================
// WINDOW BOUNDS
// ============================================================================

/// Inclusive validity bounds over `[0, len)`. Indices outside them have no
/// full window and emit None. Signed because a chunk wider than the frame
/// pushes `end` below zero, invalidating every index.
fn validity_bounds(window: WindowType, len: i64, chunk: i64) -> (i64, i64) {
    match window {
        WindowType::Center => {
            let begin = chunk / 2;
            (begin, len - begin - if chunk % 2 == 0 { 0 } else { 1 })
        }
        WindowType::Lead => (0, len - chunk),
        WindowType::Trail => (chunk - 1, len - 1),
    }
}

/// Half-open sub-range `[begin, end)` feeding index `n`'s average. Centered
/// windows of even width lean one slot backward.
fn window_range(window: WindowType, n: i64, chunk: i64) -> (i64, i64) {
    match window {
        WindowType::Center => {
            let half = chunk / 2;
            (n - half, n + half - if chunk % 2 == 0 { 1 } else { 0 } + 1)
        }
        WindowType::Lead => (n, n + chunk),
        WindowType::Trail => (n - chunk + 1, n + 1),
    }
}

// ============================================================================
// MOVING AVERAGE
// ============================================================================

/// Computes the moving average of one field across the frame.
///
/// Returns one slot per input record, aligned index for index: None outside
/// the window type's validity bounds, otherwise the average of the field
/// over that index's window. Averages come from the group pipeline, so a
/// window whose field never resolves to a number surfaces NaN rather than
/// None, while a zero-width window produces no consolidated record and
/// stays None. The output is a plain sequence, deliberately not wrapped
/// back into a frame.
pub fn moving_average(records: &Frame, options: &MovingAverageOptions) -> Vec<Option<f64>> {
    let len = records.len() as i64;
    let chunk = options.chunk as i64;
    let (begin, end) = validity_bounds(options.window, len, chunk);
    debug!(
        "moving average over '{}': {} chunk {}, valid indices [{}, {}]",
        options.field,
        options.window.as_str(),
        options.chunk,
        begin,
        end
    );

    // One specification serves every window
    let spec = GroupSpec {
        group_by: Vec::new(),
        calculations: vec![CalculationNode::new(
            WINDOW_RESULT_KEY.to_string(),
            AggregateOp::Avg,
            CalcParam::Path(options.field.clone()),
        )],
    };

    (0..len)
        .map(|n| {
            if n < begin || n > end {
                return None;
            }
            let (range_begin, range_end) = window_range(options.window, n, chunk);
            let slice = records.slice(range_begin.max(0) as usize, range_end.max(0) as usize);
            group_with_spec(&slice, &spec)
                .get(0)
                .and_then(|record| record.get(WINDOW_RESULT_KEY))
                .and_then(DataValue::as_f64)
        })
        .collect()
}
