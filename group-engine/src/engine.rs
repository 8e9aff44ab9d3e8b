//! FILENAME: group-engine/src/engine.rs
//! Group Engine - The calculation core that turns records into consolidated output.
//!
//! This module takes a GroupSpec (configuration) and a Frame (data) and
//! produces a new Frame holding one consolidated record per bucket.
//!
//! Algorithm:
//! 1. Resolve every grouping-condition path per record into a key tuple
//! 2. Concatenate the stringified tuple into one comparison key
//! 3. Bucket records by key in a single pass, first-seen order preserved
//! 4. Re-nest each bucket's grouping values from its first record
//! 5. Evaluate every calculation over the bucket and write it as a flat key
//! 6. Wrap the consolidated records back into a Frame

use std::collections::hash_map::Entry;

use frame::{merge_values, nest_path, resolve_path, DataValue, Frame, ValueMap};
use log::trace;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::definition::{AggregateOp, CalcParam, GroupSpec};

// ============================================================================
// NUMERIC COERCION
// ============================================================================

/// Resolves a path to its numeric value. Anything that is not a number,
/// including an absent path, contributes NaN, which propagates through the
/// arithmetic unmasked.
fn resolve_numeric(record: &DataValue, path: &str) -> f64 {
    resolve_path(record, path).and_then(DataValue::as_f64).unwrap_or(f64::NAN)
}

fn literal_numeric(value: &DataValue) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

// ============================================================================
// OPERATOR EVALUATION
// ============================================================================

impl AggregateOp {
    /// Evaluates this operator over a bucket of records.
    ///
    /// Every operator accepts all four parameter shapes so nested
    /// calculation trees compose transparently: a nested node is evaluated
    /// against each record individually and its results accumulate across
    /// the bucket. An empty bucket yields the operator's identity (0 for
    /// Sum, 1 for Multiply) or NaN for Avg's zero-contribution division.
    pub fn apply(&self, group: &[DataValue], param: &CalcParam) -> f64 {
        match self {
            AggregateOp::Sum => apply_sum(group, param),
            AggregateOp::Avg => apply_avg(group, param),
            AggregateOp::Multiply => apply_multiply(group, param),
        }
    }
}

fn apply_sum(group: &[DataValue], param: &CalcParam) -> f64 {
    let mut reduced = 0.0;
    for record in group {
        match param {
            CalcParam::Literal(value) => reduced += literal_numeric(value),
            CalcParam::Path(path) => reduced += resolve_numeric(record, path),
            CalcParam::Paths(paths) => {
                reduced += paths.iter().map(|path| resolve_numeric(record, path)).sum::<f64>()
            }
            CalcParam::Calc(node) => {
                reduced += node.operation.apply(std::slice::from_ref(record), &node.param)
            }
        }
    }
    reduced
}

fn apply_avg(group: &[DataValue], param: &CalcParam) -> f64 {
    let mut reduced = 0.0;
    let mut counter = 0.0;
    for record in group {
        match param {
            CalcParam::Literal(value) => {
                reduced += literal_numeric(value);
                counter += 1.0;
            }
            CalcParam::Path(path) => {
                reduced += resolve_numeric(record, path);
                counter += 1.0;
            }
            CalcParam::Paths(paths) => {
                // Per-record multi-field average: assigned, not added, and
                // divided by the path count rather than the bucket size
                reduced = paths.iter().map(|path| resolve_numeric(record, path)).sum::<f64>();
                counter = paths.len() as f64;
            }
            CalcParam::Calc(node) => {
                reduced += node.operation.apply(std::slice::from_ref(record), &node.param);
                counter += 1.0;
            }
        }
    }
    reduced / counter
}

fn apply_multiply(group: &[DataValue], param: &CalcParam) -> f64 {
    let mut reduced = 1.0;
    for record in group {
        match param {
            CalcParam::Literal(value) => reduced *= literal_numeric(value),
            CalcParam::Path(path) => reduced *= resolve_numeric(record, path),
            CalcParam::Paths(paths) => {
                reduced *= paths.iter().map(|path| resolve_numeric(record, path)).product::<f64>()
            }
            CalcParam::Calc(node) => {
                reduced *= node.operation.apply(std::slice::from_ref(record), &node.param)
            }
        }
    }
    reduced
}

// ============================================================================
// GROUPING
// ============================================================================

/// Stringifies one resolved grouping value into its key fragment. Absent
/// values and nulls both contribute the empty string, so records missing a
/// grouping field share a bucket. Distinct tuples that stringify
/// identically collide; key fragments are not escaped.
fn key_fragment(value: Option<&DataValue>) -> String {
    match value {
        Some(value) => value.display_value(),
        None => String::new(),
    }
}

/// Groups the frame by a shape object and consolidates each bucket.
///
/// The shape is compiled permissively on every call; `group_with_spec`
/// reuses a compiled (or strict-checked) specification instead.
pub fn group(records: &Frame, shape: &DataValue) -> Frame {
    group_with_spec(records, &GroupSpec::compile(shape))
}

/// Runs a compiled specification against the frame.
///
/// A single linear pass appends each record to the bucket keyed by its
/// concatenated grouping values, creating buckets in first-seen key order.
/// With no grouping conditions every record shares the empty key, so a
/// non-empty frame produces exactly one bucket (and an empty frame none).
pub fn group_with_spec(records: &Frame, spec: &GroupSpec) -> Frame {
    let mut bucket_index: FxHashMap<String, usize> = FxHashMap::default();
    let mut buckets: Vec<Vec<DataValue>> = Vec::new();

    for record in records {
        let fragments: SmallVec<[String; 4]> = spec
            .group_by
            .iter()
            .map(|condition| key_fragment(resolve_path(record, &condition.path)))
            .collect();

        match bucket_index.entry(fragments.concat()) {
            Entry::Occupied(slot) => buckets[*slot.get()].push(record.clone()),
            Entry::Vacant(slot) => {
                slot.insert(buckets.len());
                buckets.push(vec![record.clone()]);
            }
        }
    }
    trace!("bucketed {} records into {} groups", records.len(), buckets.len());

    Frame::new(buckets.iter().map(|bucket| consolidate_bucket(bucket, spec)).collect())
}

// ============================================================================
// CONSOLIDATION
// ============================================================================

/// Builds one output record for a bucket.
///
/// Grouping values re-nest under their condition names, read from the
/// bucket's first record (every member shares them by construction); an
/// absent value still materializes its key as null. Calculations then
/// write their results as flat top-level keys, never re-nested, even when
/// a name looks path-like.
fn consolidate_bucket(bucket: &[DataValue], spec: &GroupSpec) -> DataValue {
    let template = bucket.first();
    let mut consolidated = DataValue::Object(ValueMap::new());

    for condition in &spec.group_by {
        let value = template
            .and_then(|record| resolve_path(record, &condition.path))
            .cloned()
            .unwrap_or(DataValue::Null);
        consolidated = merge_values(consolidated, nest_path(value, &condition.name));
    }

    if let DataValue::Object(ref mut map) = consolidated {
        for calculation in &spec.calculations {
            let result = calculation.operation.apply(bucket, &calculation.param);
            map.insert(calculation.name.clone(), DataValue::Number(result));
        }
    }

    consolidated
}
