//! Field descriptors: the output shape of schema inference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Warehouse column type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Timestamp,
    Datetime,
    Date,
    Time,
    #[serde(alias = "FLOAT64")]
    Float,
    #[serde(alias = "INT64")]
    Integer,
    #[serde(alias = "BOOL")]
    Boolean,
    #[serde(alias = "STRUCT")]
    Record,
    Bytes,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::String,
        FieldType::Timestamp,
        FieldType::Datetime,
        FieldType::Date,
        FieldType::Time,
        FieldType::Float,
        FieldType::Integer,
        FieldType::Boolean,
        FieldType::Record,
        FieldType::Bytes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Datetime => "DATETIME",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Float => "FLOAT",
            FieldType::Integer => "INTEGER",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Record => "RECORD",
            FieldType::Bytes => "BYTES",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown type tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field type `{0}` (expected one of STRING, TIMESTAMP, DATETIME, DATE, TIME, FLOAT, INTEGER, BOOLEAN, RECORD, BYTES)")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRING" => Ok(FieldType::String),
            "TIMESTAMP" => Ok(FieldType::Timestamp),
            "DATETIME" => Ok(FieldType::Datetime),
            "DATE" => Ok(FieldType::Date),
            "TIME" => Ok(FieldType::Time),
            "FLOAT" | "FLOAT64" => Ok(FieldType::Float),
            "INTEGER" | "INT64" => Ok(FieldType::Integer),
            "BOOLEAN" | "BOOL" => Ok(FieldType::Boolean),
            "RECORD" | "STRUCT" => Ok(FieldType::Record),
            "BYTES" => Ok(FieldType::Bytes),
            _ => Err(UnknownFieldType(s.to_string())),
        }
    }
}

/// Cardinality of a field's values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl FieldMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
        }
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a warehouse table schema.
///
/// `fields` is `Some` exactly when `field_type` is [`FieldType::Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub mode: FieldMode,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// A leaf field with an empty description
    pub fn new(name: impl Into<String>, field_type: FieldType, mode: FieldMode) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode,
            description: String::new(),
            fields: None,
        }
    }

    /// Attach nested fields (only meaningful for RECORD)
    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn is_record(&self) -> bool {
        self.field_type == FieldType::Record
    }
}

/// Ordered sequence of field descriptors describing a record's shape
pub type Schema = Vec<FieldDescriptor>;
