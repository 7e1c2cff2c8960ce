pub mod error;
pub mod field;
pub mod patterns;
pub mod sample;
pub mod schema;
pub mod validate;

// Re-export commonly used items
pub use error::{InferenceError, Result};
pub use field::{FieldDescriptor, FieldMode, FieldType, Schema, UnknownFieldType};
pub use sample::{Sample, SampleValue, SampleView};
pub use schema::{SchemaGenerator, SchemaInferenceConfig, DEFAULT_MAX_DEPTH};
pub use validate::{is_valid_calendar_date, validate, Mismatch, MismatchKind, Validator};

/// Helper function to infer a schema from one sample record
pub fn infer_schema<'a, S: Sample<'a>>(
    sample: S,
    config: Option<SchemaInferenceConfig>,
) -> Result<Schema> {
    SchemaGenerator::new(config.unwrap_or_default())?.infer(sample)
}

/// Helper function to infer a schema from a JSON document holding one record
pub fn infer_schema_from_str(json: &str, config: Option<SchemaInferenceConfig>) -> Result<Schema> {
    SchemaGenerator::new(config.unwrap_or_default())?.infer_str(json)
}

/// Create a default schema inference configuration
pub fn default_config() -> SchemaInferenceConfig {
    SchemaInferenceConfig::default()
}
