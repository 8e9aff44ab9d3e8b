//! FILENAME: frame/src/value.rs
//! PURPOSE: Defines the dynamic value type every record is made of.
//! CONTEXT: This file contains the `DataValue` enum, the self-describing
//! value that records, record fields, and aggregation results are built
//! from. Objects keep their keys in insertion order so that downstream
//! flattening and consolidation are deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered mapping used for the object variant.
pub type ValueMap = IndexMap<String, DataValue>;

/// A dynamic, JSON-shaped value.
///
/// Untagged so that literals serialize as plain JSON (`null`, `3.5`,
/// `"text"`, `[..]`, `{..}`) rather than as enum wrappers. All numbers are
/// f64; NaN is representable in memory but becomes `null` when converted
/// out to JSON, which cannot carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Array(Vec<DataValue>),
    Object(ValueMap),
}

impl DataValue {
    /// Returns the numeric content, or None for every non-number variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text content, or None for every non-text variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object map, or None for every non-object variant.
    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            DataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array elements, or None for every non-array variant.
    pub fn as_array(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DataValue::Object(_))
    }

    /// Looks up a direct child of an object by key.
    /// Returns None for non-objects and missing keys alike.
    pub fn get(&self, key: &str) -> Option<&DataValue> {
        match self {
            DataValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the display form of the value as a String.
    /// Grouping keys and diagnostics both rely on this; numbers drop
    /// unnecessary decimal places, nulls render as the empty string, and
    /// composite values render as their JSON text.
    pub fn display_value(&self) -> String {
        match self {
            DataValue::Null => String::new(),
            DataValue::Bool(b) => b.to_string(),
            DataValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            DataValue::Text(s) => s.clone(),
            DataValue::Array(_) | DataValue::Object(_) => {
                serde_json::Value::from(self.clone()).to_string()
            }
        }
    }
}

impl Default for DataValue {
    fn default() -> Self {
        DataValue::Null
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<f64> for DataValue {
    fn from(n: f64) -> Self {
        DataValue::Number(n)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}

impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DataValue::Null,
            serde_json::Value::Bool(b) => DataValue::Bool(b),
            // Integers outside f64's exact range degrade like they would in JSON
            serde_json::Value::Number(n) => DataValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => DataValue::Text(s),
            serde_json::Value::Array(items) => {
                DataValue::Array(items.into_iter().map(DataValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                DataValue::Object(map.into_iter().map(|(k, v)| (k, DataValue::from(v))).collect())
            }
        }
    }
}

impl From<DataValue> for serde_json::Value {
    fn from(value: DataValue) -> Self {
        match value {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(b),
            DataValue::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                // NaN and infinities have no JSON form
                .unwrap_or(serde_json::Value::Null),
            DataValue::Text(s) => serde_json::Value::String(s),
            DataValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            DataValue::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, serde_json::Value::from(v))).collect(),
            ),
        }
    }
}
