//! FILENAME: group-engine/src/definition.rs
//! Group Specification - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a grouping run.
//! These structures are designed to be:
//! - Serializable (specs are plain data; they can be stored and replayed)
//! - Compiled once per invocation from the caller's shape object
//! - Immutable snapshots of caller intent
//!
//! The shape compiler lives here too: it flattens a nested shape object
//! into dotted keys and classifies each leaf as either a grouping
//! condition or a calculation tree.

use frame::{DataValue, DATA_KEY};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// The leading marker identifying a key segment as an operator tag.
pub const OPERATOR_SIGIL: char = '$';

// ============================================================================
// AGGREGATION OPERATORS
// ============================================================================

/// Registered aggregation operators, keyed by their `$`-sigil tag.
/// Adding an operator means adding a variant here plus its arm in
/// `AggregateOp::apply`; every operator handles all four parameter shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateOp {
    Sum,
    Avg,
    Multiply,
}

impl AggregateOp {
    /// The sigil tag this operator is registered under.
    pub fn tag(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "$sum",
            AggregateOp::Avg => "$avg",
            AggregateOp::Multiply => "$multiply",
        }
    }

    /// Looks a key segment up in the registry.
    pub fn parse(segment: &str) -> Option<AggregateOp> {
        match segment {
            "$sum" => Some(AggregateOp::Sum),
            "$avg" => Some(AggregateOp::Avg),
            "$multiply" => Some(AggregateOp::Multiply),
            _ => None,
        }
    }

    pub fn all() -> [AggregateOp; 3] {
        [AggregateOp::Sum, AggregateOp::Avg, AggregateOp::Multiply]
    }
}

impl Default for AggregateOp {
    fn default() -> Self {
        AggregateOp::Sum
    }
}

// ============================================================================
// GROUPING CONDITIONS
// ============================================================================

/// One grouping directive: read `path` from every record, key buckets by
/// the value, and re-nest it under `name` in the consolidated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingCondition {
    /// Dotted output location (the flattened shape key the caller wrote).
    pub name: String,

    /// Dotted source location read from each record.
    pub path: String,
}

impl GroupingCondition {
    pub fn new(name: String, path: String) -> Self {
        GroupingCondition { name, path }
    }
}

// ============================================================================
// CALCULATIONS
// ============================================================================

/// A compiled calculation parameter. The compiler decides the variant once;
/// evaluation dispatches on it without re-inspecting values at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalcParam {
    /// A constant contributed once per record.
    Literal(DataValue),
    /// A dotted path resolved per record.
    Path(String),
    /// Several dotted paths resolved per record and combined record-wise.
    Paths(Vec<String>),
    /// A nested calculation evaluated against each record individually.
    Calc(Box<CalculationNode>),
}

impl CalcParam {
    /// Derives the parameter for an operator key with no further segments:
    /// text leaves are paths, arrays are path lists, anything else is a
    /// literal. Non-text array elements fall back to their display form.
    fn from_leaf(leaf: &DataValue) -> CalcParam {
        if let Some(path) = leaf.as_str() {
            return CalcParam::Path(path.to_string());
        }
        if let Some(items) = leaf.as_array() {
            return CalcParam::Paths(
                items
                    .iter()
                    .map(|item| match item.as_str() {
                        Some(path) => path.to_string(),
                        None => item.display_value(),
                    })
                    .collect(),
            );
        }
        CalcParam::Literal(leaf.clone())
    }
}

/// One named calculation: an operator applied over a bucket with a compiled
/// parameter, which may itself nest further calculations (one node per
/// chained operator in the original shape key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationNode {
    /// Flat output key the result is written under. Empty for nested nodes
    /// introduced by pure-operator chains.
    pub name: String,

    /// The operator applied at this level.
    pub operation: AggregateOp,

    /// What the operator aggregates.
    pub param: CalcParam,
}

impl CalculationNode {
    pub fn new(name: String, operation: AggregateOp, param: CalcParam) -> Self {
        CalculationNode { name, operation, param }
    }
}

// ============================================================================
// GROUP SPECIFICATION
// ============================================================================

/// The complete, compiled specification of one grouping run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Grouping conditions, in shape order.
    pub group_by: Vec<GroupingCondition>,

    /// Named calculations, in shape order.
    pub calculations: Vec<CalculationNode>,
}

impl GroupSpec {
    /// Compiles a caller's shape object.
    ///
    /// Flattens the nested shape into dotted keys, then classifies each
    /// leaf: keys containing a registered operator segment become
    /// calculations, everything else becomes a grouping condition. This
    /// mode is permissive and never fails: unknown `$` segments count as
    /// ordinary name segments, non-text grouping leaves group by their
    /// display form, and name segments left over after an operator chain
    /// are dropped.
    pub fn compile(shape: &DataValue) -> GroupSpec {
        let mut spec = GroupSpec::default();
        for (key, leaf) in flatten_shape(shape) {
            let segments: Vec<&str> = key.split('.').collect();
            match build_calculation(&segments, leaf) {
                Some(node) => spec.calculations.push(node),
                None => {
                    let path = match leaf.as_str() {
                        Some(path) => path.to_string(),
                        None => leaf.display_value(),
                    };
                    spec.group_by.push(GroupingCondition::new(key, path));
                }
            }
        }
        debug!(
            "compiled shape: {} grouping conditions, {} calculations",
            spec.group_by.len(),
            spec.calculations.len()
        );
        spec
    }

    /// Compiles a shape object, rejecting the spellings the permissive
    /// mode silently repairs. The compiled output is identical to
    /// `compile` whenever this returns Ok.
    pub fn compile_strict(shape: &DataValue) -> Result<GroupSpec, SpecError> {
        for (key, leaf) in flatten_shape(shape) {
            validate_key(&key, leaf)?;
        }
        Ok(GroupSpec::compile(shape))
    }
}

// ============================================================================
// SHAPE FLATTENING & CLASSIFICATION
// ============================================================================

/// Flattens a nested shape into dotted-key leaves, insertion order
/// preserved. A leaf is anything that is not an object; empty objects
/// flatten to nothing. Non-object shapes have no entries at all, which
/// compiles to the degenerate single-bucket spec.
fn flatten_shape(shape: &DataValue) -> Vec<(String, &DataValue)> {
    let mut flat = Vec::new();
    if let DataValue::Object(map) = shape {
        for (key, value) in map {
            flatten_into(key.clone(), value, &mut flat);
        }
    }
    flat
}

fn flatten_into<'a>(path: String, value: &'a DataValue, flat: &mut Vec<(String, &'a DataValue)>) {
    match value {
        DataValue::Object(map) => {
            for (key, child) in map {
                flatten_into(format!("{}.{}", path, key), child, flat);
            }
        }
        leaf => flat.push((path, leaf)),
    }
}

/// Parses one flattened key into its calculation tree. Returns None when
/// the segments contain no registered operator, which makes the key a
/// grouping condition instead.
///
/// At each level the leading non-operator segments join into the node's
/// name, the first operator segment becomes its operation, and whatever
/// follows recurses into the parameter. When nothing follows (or only
/// operator-less names follow), the leaf value decides the parameter.
fn build_calculation(segments: &[&str], leaf: &DataValue) -> Option<CalculationNode> {
    let (op_index, operation) = segments
        .iter()
        .enumerate()
        .find_map(|(index, segment)| AggregateOp::parse(segment).map(|op| (index, op)))?;
    let name = segments[..op_index].join(".");
    let remaining = &segments[op_index + 1..];

    let param = if remaining.is_empty() {
        CalcParam::from_leaf(leaf)
    } else {
        match build_calculation(remaining, leaf) {
            Some(nested) => CalcParam::Calc(Box::new(nested)),
            None => CalcParam::from_leaf(leaf),
        }
    };

    Some(CalculationNode { name, operation, param })
}

/// Strict-mode validation for one flattened key.
fn validate_key(key: &str, leaf: &DataValue) -> Result<(), SpecError> {
    let segments: Vec<&str> = key.split('.').collect();

    // Every sigil-led segment must name a registered operator
    for segment in &segments {
        if segment.starts_with(OPERATOR_SIGIL) && AggregateOp::parse(segment).is_none() {
            return Err(SpecError::UnknownOperator((*segment).to_string()));
        }
    }

    match segments.iter().position(|segment| AggregateOp::parse(segment).is_some()) {
        // Grouping keys must map to a path string
        None => match leaf {
            DataValue::Text(_) => Ok(()),
            _ => Err(SpecError::InvalidGroupingPath(key.to_string())),
        },
        Some(_) => {
            if chain_has_dangling_segments(&segments) {
                Err(SpecError::DanglingSegments(key.to_string()))
            } else {
                Ok(())
            }
        }
    }
}

/// True when the key ends in name segments no operator consumes (the
/// permissive compiler would silently drop them).
fn chain_has_dangling_segments(segments: &[&str]) -> bool {
    match segments.iter().position(|segment| AggregateOp::parse(segment).is_some()) {
        Some(op_index) => {
            let remaining = &segments[op_index + 1..];
            !remaining.is_empty() && chain_has_dangling_segments(remaining)
        }
        None => true,
    }
}

// ============================================================================
// MOVING AVERAGE OPTIONS
// ============================================================================

/// Which sub-range of indices contributes to a moving-average output
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WindowType {
    /// Window centered on the index; even chunks lean one slot backward.
    Center,
    /// Forward-looking window starting at the index.
    Lead,
    /// Backward-looking window ending at the index.
    Trail,
}

impl WindowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowType::Center => "CENTER",
            WindowType::Lead => "LEAD",
            WindowType::Trail => "TRAIL",
        }
    }

    pub fn parse(text: &str) -> Option<WindowType> {
        match text {
            "CENTER" => Some(WindowType::Center),
            "LEAD" => Some(WindowType::Lead),
            "TRAIL" => Some(WindowType::Trail),
            _ => None,
        }
    }

    pub fn all() -> [WindowType; 3] {
        [WindowType::Center, WindowType::Lead, WindowType::Trail]
    }
}

/// Options for one moving-average run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageOptions {
    /// Window width in records.
    pub chunk: usize,

    /// Window placement relative to each output index.
    #[serde(rename = "type")]
    pub window: WindowType,

    /// Dotted path of the averaged field. Defaults to the wrapper key
    /// primitive records are normalized under.
    #[serde(default = "default_field")]
    pub field: String,
}

fn default_field() -> String {
    DATA_KEY.to_string()
}

impl MovingAverageOptions {
    pub fn new(chunk: usize, window: WindowType) -> Self {
        MovingAverageOptions {
            chunk,
            window,
            field: default_field(),
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = field;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile_shape(shape: serde_json::Value) -> GroupSpec {
        GroupSpec::compile(&DataValue::from(shape))
    }

    #[test]
    fn test_plain_leaves_become_grouping_conditions() {
        let spec = compile_shape(json!({
            "item": {"name": "item.name", "discount": "item.discount"}
        }));

        assert!(spec.calculations.is_empty());
        assert_eq!(
            spec.group_by,
            vec![
                GroupingCondition::new("item.name".to_string(), "item.name".to_string()),
                GroupingCondition::new("item.discount".to_string(), "item.discount".to_string()),
            ]
        );
    }

    #[test]
    fn test_operator_leaf_becomes_calculation() {
        let spec = compile_shape(json!({"total": {"$sum": "quantity"}}));

        assert!(spec.group_by.is_empty());
        assert_eq!(
            spec.calculations,
            vec![CalculationNode::new(
                "total".to_string(),
                AggregateOp::Sum,
                CalcParam::Path("quantity".to_string()),
            )]
        );
    }

    #[test]
    fn test_operator_chain_nests_one_node_per_operator() {
        let spec = compile_shape(json!({"combined": {"$sum": {"$avg": ["a", "b"]}}}));

        let expected = CalculationNode::new(
            "combined".to_string(),
            AggregateOp::Sum,
            CalcParam::Calc(Box::new(CalculationNode::new(
                String::new(),
                AggregateOp::Avg,
                CalcParam::Paths(vec!["a".to_string(), "b".to_string()]),
            ))),
        );
        assert_eq!(spec.calculations, vec![expected]);
    }

    #[test]
    fn test_literal_leaf_parameter() {
        let spec = compile_shape(json!({"padding": {"$sum": 2}}));

        assert_eq!(
            spec.calculations[0].param,
            CalcParam::Literal(DataValue::Number(2.0))
        );
    }

    #[test]
    fn test_non_text_array_elements_use_display_form() {
        let spec = compile_shape(json!({"mean": {"$avg": ["qty", 5]}}));

        assert_eq!(
            spec.calculations[0].param,
            CalcParam::Paths(vec!["qty".to_string(), "5".to_string()])
        );
    }

    #[test]
    fn test_mixed_shape_keeps_insertion_order() {
        let spec = compile_shape(json!({
            "item": {"name": "item.name"},
            "total": {"$sum": "qty"},
            "vendor": "vendor.id"
        }));

        assert_eq!(spec.group_by[0].name, "item.name");
        assert_eq!(spec.group_by[1].name, "vendor");
        assert_eq!(spec.calculations[0].name, "total");
    }

    #[test]
    fn test_unknown_sigil_reclassifies_as_grouping() {
        let spec = compile_shape(json!({"x": {"$median": "qty"}}));

        assert!(spec.calculations.is_empty());
        assert_eq!(spec.group_by[0].name, "x.$median");
        assert_eq!(spec.group_by[0].path, "qty");
    }

    #[test]
    fn test_non_text_grouping_leaf_uses_display_form() {
        let spec = compile_shape(json!({"k": 5, "flag": true}));

        assert!(spec.calculations.is_empty());
        assert_eq!(
            spec.group_by,
            vec![
                GroupingCondition::new("k".to_string(), "5".to_string()),
                GroupingCondition::new("flag".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_dangling_segments_fall_back_to_leaf() {
        // The stray "y" cannot be consumed by any operator; the leaf wins
        let spec = compile_shape(json!({"x": {"$sum": {"y": "qty"}}}));

        assert_eq!(spec.calculations[0].name, "x");
        assert_eq!(spec.calculations[0].param, CalcParam::Path("qty".to_string()));
    }

    #[test]
    fn test_multi_segment_name_joins_with_dots() {
        let spec = compile_shape(json!({"order": {"total": {"$sum": "qty"}}}));

        assert_eq!(spec.calculations[0].name, "order.total");
        assert_eq!(spec.calculations[0].operation, AggregateOp::Sum);
    }

    #[test]
    fn test_empty_and_non_object_shapes_compile_empty() {
        assert_eq!(compile_shape(json!({})), GroupSpec::default());
        assert_eq!(compile_shape(json!(41)), GroupSpec::default());
    }

    #[test]
    fn test_compile_strict_rejects_unknown_operator() {
        let shape = DataValue::from(json!({"x": {"$median": "qty"}}));
        assert_eq!(
            GroupSpec::compile_strict(&shape),
            Err(SpecError::UnknownOperator("$median".to_string()))
        );
    }

    #[test]
    fn test_compile_strict_rejects_non_text_grouping_leaf() {
        let shape = DataValue::from(json!({"k": 5}));
        assert_eq!(
            GroupSpec::compile_strict(&shape),
            Err(SpecError::InvalidGroupingPath("k".to_string()))
        );
    }

    #[test]
    fn test_compile_strict_rejects_dangling_segments() {
        let shape = DataValue::from(json!({"x": {"$sum": {"y": "qty"}}}));
        assert_eq!(
            GroupSpec::compile_strict(&shape),
            Err(SpecError::DanglingSegments("x.$sum.y".to_string()))
        );
    }

    #[test]
    fn test_compile_strict_accepts_valid_shapes() {
        let shape = DataValue::from(json!({
            "item": {"name": "item.name"},
            "total": {"$sum": {"$avg": ["a", "b"]}}
        }));
        let strict = GroupSpec::compile_strict(&shape).unwrap();
        assert_eq!(strict, GroupSpec::compile(&shape));
    }

    #[test]
    fn test_operator_registry_round_trips() {
        for op in AggregateOp::all() {
            assert_eq!(AggregateOp::parse(op.tag()), Some(op));
        }
        assert_eq!(AggregateOp::parse("$median"), None);
    }

    #[test]
    fn test_window_type_round_trips() {
        for window in WindowType::all() {
            assert_eq!(WindowType::parse(window.as_str()), Some(window));
        }
        assert_eq!(WindowType::parse("SIDEWAYS"), None);
    }

    #[test]
    fn test_moving_average_options_serde() {
        let options: MovingAverageOptions =
            serde_json::from_value(json!({"chunk": 4, "type": "CENTER"})).unwrap();
        assert_eq!(options.chunk, 4);
        assert_eq!(options.window, WindowType::Center);
        assert_eq!(options.field, DATA_KEY);

        let explicit: MovingAverageOptions =
            serde_json::from_value(json!({"chunk": 2, "type": "TRAIL", "field": "qty"})).unwrap();
        assert_eq!(explicit.field, "qty");
    }
}
