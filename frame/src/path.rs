//! FILENAME: frame/src/path.rs
//! PURPOSE: Dot-path addressing into nested records.
//! CONTEXT: This file implements the three shape primitives the grouping
//! pipeline is built on: reading a value at a dotted address, re-nesting a
//! value under a dotted address, and deep-merging nested fragments.
//! Resolution never fails; absence is an ordinary result.

use crate::value::{DataValue, ValueMap};
use indexmap::map::Entry;

/// Reads the value at a dot-separated address inside a record.
///
/// Walks one segment at a time: objects descend by key, arrays by numeric
/// index. A missing key (or unparseable index) yields `None`. If the walk
/// reaches a scalar while segments remain, it stops early and returns that
/// scalar unchanged. `.` is the only separator; keys containing a literal
/// dot are not addressable.
pub fn resolve_path<'a>(record: &'a DataValue, path: &str) -> Option<&'a DataValue> {
    let mut current = record;
    for segment in path.split('.') {
        match current {
            DataValue::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => return None,
            },
            DataValue::Array(items) => {
                match segment.parse::<usize>().ok().and_then(|index| items.get(index)) {
                    Some(next) => current = next,
                    None => return None,
                }
            }
            _ => return Some(current),
        }
    }
    Some(current)
}

/// Builds a brand-new nested object whose only populated branch is `path`,
/// with `value` at the leaf. `nest_path(v, "a.b")` returns `{a: {b: v}}`.
pub fn nest_path(value: DataValue, path: &str) -> DataValue {
    path.rsplit('.').fold(value, |nested, segment| {
        let mut map = ValueMap::new();
        map.insert(segment.to_string(), nested);
        DataValue::Object(map)
    })
}

/// Deep-merges `addition` into `base` and returns the result.
///
/// When both sides hold objects, colliding keys merge recursively and new
/// keys append in `addition`'s order. Any non-object collision resolves in
/// favor of `addition`.
pub fn merge_values(base: DataValue, addition: DataValue) -> DataValue {
    match (base, addition) {
        (DataValue::Object(mut base_map), DataValue::Object(addition_map)) => {
            for (key, value) in addition_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut slot) => {
                        let merged = merge_values(std::mem::take(slot.get_mut()), value);
                        *slot.get_mut() = merged;
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
            DataValue::Object(base_map)
        }
        (_, addition) => addition,
    }
}
