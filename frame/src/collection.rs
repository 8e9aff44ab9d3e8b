//! FILENAME: frame/src/collection.rs
//! PURPOSE: Manages the ordered collection of records (The Frame).
//! CONTEXT: This file defines the `Frame` struct which acts as the container
//! the grouping and windowing operations run against. Records are stored in
//! an owned vector in insertion order; primitive inputs are normalized into
//! `{"$data": value}` records so every downstream consumer sees a mapping.

use crate::error::FrameError;
use crate::value::{DataValue, ValueMap};

/// Reserved key primitive elements are wrapped under during normalization.
pub const DATA_KEY: &str = "$data";

/// The Frame struct holds an ordered, finite collection of records.
/// It is an immutable input to every operation; grouping and slicing
/// return fresh frames so calls can be chained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    records: Vec<DataValue>,
}

impl Frame {
    /// Creates a frame from already-normalized records.
    pub fn new(records: Vec<DataValue>) -> Self {
        Frame { records }
    }

    /// Creates a frame from arbitrary values, wrapping every non-object
    /// element as `{"$data": value}` so all records are mappings.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DataValue>,
    {
        let records = values
            .into_iter()
            .map(|value| {
                let value = value.into();
                if value.is_object() {
                    value
                } else {
                    let mut wrapper = ValueMap::new();
                    wrapper.insert(DATA_KEY.to_string(), value);
                    DataValue::Object(wrapper)
                }
            })
            .collect();
        Frame { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Retrieves a reference to the record at the given index.
    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[DataValue] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataValue> {
        self.records.iter()
    }

    /// Returns a new frame over the half-open index range `[begin, end)`.
    /// Out-of-range indices clamp to the frame length rather than erroring.
    pub fn slice(&self, begin: usize, end: usize) -> Frame {
        let end = end.min(self.records.len());
        let begin = begin.min(end);
        Frame { records: self.records[begin..end].to_vec() }
    }

    /// Returns a new frame from `begin` through the end of this one.
    pub fn slice_from(&self, begin: usize) -> Frame {
        self.slice(begin, self.records.len())
    }

    /// Returns the plain values, undoing `from_values` normalization:
    /// records carrying the `$data` wrapper key unwrap to the inner value,
    /// everything else passes through unchanged.
    pub fn data(&self) -> Vec<DataValue> {
        self.records
            .iter()
            .map(|record| match record.get(DATA_KEY) {
                Some(inner) => inner.clone(),
                None => record.clone(),
            })
            .collect()
    }

    // ========================================================================
    // JSON INTEROP
    // ========================================================================

    /// Parses a frame from a JSON string holding a top-level array.
    /// Elements are normalized exactly like `from_values`.
    pub fn from_json_str(text: &str) -> Result<Frame, FrameError> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;
        match parsed {
            serde_json::Value::Array(items) => {
                Ok(Frame::from_values(items.into_iter().map(DataValue::from)))
            }
            _ => Err(FrameError::NotAnArray),
        }
    }

    /// Renders the records as a JSON array. NaN results become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.records.iter().cloned().map(serde_json::Value::from).collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a DataValue;
    type IntoIter = std::slice::Iter<'a, DataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_frame() -> Frame {
        Frame::from_values(vec![
            DataValue::from(json!({"item": "Pen", "qty": 5})),
            DataValue::from(json!({"item": "Mouse", "qty": 2})),
        ])
    }

    #[test]
    fn test_objects_pass_through_unwrapped() {
        let frame = create_test_frame();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(0).unwrap().get("item"), Some(&DataValue::from("Pen")));
        assert_eq!(frame.get(0).unwrap().get(DATA_KEY), None);
    }

    #[test]
    fn test_primitives_wrap_under_data_key() {
        let frame = Frame::from_values(vec![200.0, 5.0, 70.0]);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.get(1).unwrap().get(DATA_KEY), Some(&DataValue::Number(5.0)));
    }

    #[test]
    fn test_data_unwraps_primitives() {
        let frame = Frame::from_values(vec![200.0, 5.0]);
        assert_eq!(frame.data(), vec![DataValue::Number(200.0), DataValue::Number(5.0)]);

        // Records without the wrapper key pass through unchanged
        let frame = create_test_frame();
        assert_eq!(frame.data()[0].get("item"), Some(&DataValue::from("Pen")));
    }

    #[test]
    fn test_slice_is_half_open() {
        let frame = Frame::from_values(vec![1.0, 2.0, 3.0, 4.0]);
        let sliced = frame.slice(1, 3);
        assert_eq!(sliced.data(), vec![DataValue::Number(2.0), DataValue::Number(3.0)]);
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        let frame = Frame::from_values(vec![1.0, 2.0]);
        assert_eq!(frame.slice(0, 10).len(), 2);
        assert_eq!(frame.slice(5, 10).len(), 0);
        assert_eq!(frame.slice_from(1).len(), 1);
    }

    #[test]
    fn test_from_json_str_rejects_non_arrays() {
        assert!(matches!(Frame::from_json_str(r#"{"a": 1}"#), Err(FrameError::NotAnArray)));
        assert!(matches!(Frame::from_json_str("not json"), Err(FrameError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip_with_normalization() {
        let frame = Frame::from_json_str(r#"[{"qty": 5}, 7]"#).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(1).unwrap().get(DATA_KEY), Some(&DataValue::Number(7.0)));
        assert_eq!(frame.to_json(), json!([{"qty": 5.0}, {"$data": 7.0}]));
    }
}
