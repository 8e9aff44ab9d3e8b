//! FILENAME: group-engine/src/lib.rs
//! Grouping and aggregation subsystem for the tabular toolkit.
//!
//! This crate provides the declarative group-by engine as a standalone
//! module, separate from the record container. It depends on `frame` only
//! for shared types (DataValue, Frame) and the dot-path primitives.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the grouping run IS)
//! - `engine`: Calculation engine (HOW we group and consolidate)
//! - `window`: Windowed statistics built on the engine (moving averages)
//! - `error`: Typed errors for the opt-in strict compile mode

pub mod definition;
pub mod engine;
pub mod error;
pub mod window;

pub use definition::*;
pub use engine::{group, group_with_spec};
pub use error::SpecError;
pub use window::moving_average;
