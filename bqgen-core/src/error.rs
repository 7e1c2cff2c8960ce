//! Error types for schema inference

use thiserror::Error;

/// Errors that terminate a single inference (or validator construction) call
#[derive(Error, Debug)]
pub enum InferenceError {
    /// A value whose runtime kind maps to none of the supported field types
    #[error("Unsupported value kind `{kind}` at {path}")]
    UnsupportedValueKind { path: String, kind: &'static str },

    /// An empty array with no type override, so there is no element to classify
    #[error("Cannot infer the element type of empty array at {path}")]
    EmptyArrayAmbiguous { path: String },

    /// A record reachable from itself
    #[error("Cyclic input: record at {path} contains itself")]
    CyclicInput { path: String },

    /// `infer` was not handed a record at the top level
    #[error("Invalid top-level input: expected a record, found {kind}")]
    InvalidTopLevelInput { kind: &'static str },

    /// Arrays directly inside arrays have no warehouse representation
    #[error("Nested arrays are not supported (at {path})")]
    NestedArray { path: String },

    /// A RECORD type override on a field whose sample is not a record
    #[error("Field at {path} is forced to RECORD but its sample is {kind}")]
    RecordOverrideMismatch { path: String, kind: &'static str },

    /// Record nesting deeper than the configured limit
    #[error("Maximum nesting depth exceeded at {path} (max {max})")]
    MaxDepthExceeded { path: String, max: usize },

    /// A schema handed to the validator breaks the descriptor invariants
    #[error("Invalid schema at {path}: {reason}")]
    InvalidSchema { path: String, reason: String },

    /// JSON text could not be parsed
    #[error("Invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A format pattern failed to compile
    #[error("Pattern compilation failed: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, InferenceError>;
