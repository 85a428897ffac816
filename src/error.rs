//! Error types for fallible entry points
//!
//! The tick itself never fails; these cover loading configuration. Inventory
//! and crafting errors live next to the code that produces them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    InvalidTuning { field: &'static str, reason: String },
}
