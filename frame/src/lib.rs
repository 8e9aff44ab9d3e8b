//! FILENAME: frame/src/lib.rs
//! PURPOSE: Main library entry point for the record container.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//!
//! Layers:
//! - `value`: The dynamic value type records are made of (DataValue)
//! - `path`: Dot-path resolution, re-nesting, and deep merge
//! - `collection`: The ordered record container (Frame)
//! - `numeric` / `random`: Stateless helpers
//! - `error`: Typed ingestion errors

pub mod collection;
pub mod error;
pub mod numeric;
pub mod path;
pub mod random;
pub mod value;

// Re-export commonly used types at the crate root
pub use collection::{Frame, DATA_KEY};
pub use error::FrameError;
pub use numeric::{is_prime, round_to};
pub use path::{merge_values, nest_path, resolve_path};
pub use random::{normal, uniform, uniform_between};
pub use value::{DataValue, ValueMap};
