//! FILENAME: frame/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of records")]
    NotAnArray,
}
