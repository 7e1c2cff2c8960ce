mod config;

use std::collections::HashSet;

use serde_json::{Number, Value};
use tracing::{debug, trace};

use crate::error::{InferenceError, Result};
use crate::field::{FieldDescriptor, FieldMode, FieldType, Schema};
use crate::patterns::Patterns;
use crate::sample::{Sample, SampleView};

pub use config::{RequiredFields, ResolvedConfig, SchemaInferenceConfig, DEFAULT_MAX_DEPTH};

const ROOT_PATH: &str = "$";

/// Infers warehouse schemas from sample records.
///
/// Built once per configuration; every method takes `&self`, so one generator
/// can serve any number of concurrent inference calls.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    patterns: Patterns,
    config: ResolvedConfig,
}

impl SchemaGenerator {
    pub fn new(config: SchemaInferenceConfig) -> Result<Self> {
        Ok(Self {
            patterns: Patterns::compile()?,
            config: ResolvedConfig::resolve(config),
        })
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Infer the schema of a sample record, one field per key in key order
    pub fn infer<'a, S: Sample<'a>>(&self, sample: S) -> Result<Schema> {
        match sample.view() {
            SampleView::Record(entries) => {
                let mut walk = Walk::new(self.config.max_depth());
                let schema = self.record_fields(sample.node_id(), entries, ROOT_PATH, &mut walk)?;
                debug!(fields = schema.len(), "inferred schema");
                Ok(schema)
            }
            other => Err(InferenceError::InvalidTopLevelInput { kind: other.kind() }),
        }
    }

    /// Parse JSON text and infer the schema of the record it holds
    pub fn infer_str(&self, json: &str) -> Result<Schema> {
        let value: Value = serde_json::from_str(json)?;
        self.infer(&value)
    }

    /// Classify the type of the value stored under `key`
    pub fn detect_type<'a, S: Sample<'a>>(&self, key: &str, value: S) -> Result<FieldType> {
        self.classify_type(key, value, &format!("{ROOT_PATH}.{key}"))
    }

    /// Classify the cardinality of the value stored under `key`
    pub fn detect_mode<'a, S: Sample<'a>>(&self, key: &str, value: S) -> FieldMode {
        if value.is_array() {
            FieldMode::Repeated
        } else if self.config.is_required(key) {
            FieldMode::Required
        } else {
            FieldMode::Nullable
        }
    }

    fn classify_type<'a, S: Sample<'a>>(&self, key: &str, value: S, path: &str) -> Result<FieldType> {
        if let Some(forced) = self.config.type_override(key) {
            return Ok(forced);
        }
        match value.first_item() {
            Some(first) => {
                let first = first
                    .ok_or_else(|| InferenceError::EmptyArrayAmbiguous { path: path.to_string() })?;
                // only the first element is inspected
                self.classify_element(first.view(), path)
            }
            None => self.classify_element(value.view(), path),
        }
    }

    fn classify_element<S>(&self, view: SampleView<'_, S>, path: &str) -> Result<FieldType> {
        match view {
            SampleView::Absent => Ok(FieldType::String),
            SampleView::String(s) => Ok(self.classify_string(s)),
            SampleView::Number(n) => Ok(classify_number(n)),
            SampleView::Bool(_) => Ok(FieldType::Boolean),
            SampleView::Record(_) => Ok(FieldType::Record),
            SampleView::Bytes(_) => Ok(FieldType::Bytes),
            SampleView::Array(_) => Err(InferenceError::NestedArray { path: path.to_string() }),
            SampleView::Unsupported(kind) => Err(InferenceError::UnsupportedValueKind {
                path: path.to_string(),
                kind,
            }),
        }
    }

    /// Bare dates are DATE even though the DATETIME pattern accepts them too
    fn classify_string(&self, value: &str) -> FieldType {
        let field_type = if self.patterns.is_date(value) {
            FieldType::Date
        } else if self.patterns.is_time(value) {
            FieldType::Time
        } else if self.patterns.is_datetime(value) {
            FieldType::Datetime
        } else if self.patterns.is_timestamp(value) {
            FieldType::Timestamp
        } else {
            FieldType::String
        };
        trace!(value, %field_type, "sniffed string");
        field_type
    }

    fn record_fields<'a, S: Sample<'a>>(
        &self,
        node_id: usize,
        entries: Vec<(&'a str, S)>,
        path: &str,
        walk: &mut Walk,
    ) -> Result<Schema> {
        walk.enter(node_id, path)?;
        let fields = entries
            .into_iter()
            .map(|(key, value)| self.field(key, value, &format!("{path}.{key}"), walk))
            .collect::<Result<Schema>>();
        walk.leave(node_id);
        fields
    }

    fn field<'a, S: Sample<'a>>(
        &self,
        key: &str,
        value: S,
        path: &str,
        walk: &mut Walk,
    ) -> Result<FieldDescriptor> {
        let field_type = self.classify_type(key, value, path)?;
        let mode = self.detect_mode(key, value);
        debug!(path, %field_type, %mode, "classified field");

        let mut field = FieldDescriptor::new(key, field_type, mode);
        if field_type == FieldType::Record {
            let (source, source_path) = if mode == FieldMode::Repeated {
                (first_element(value, path)?, format!("{path}[0]"))
            } else {
                (value, path.to_string())
            };
            match source.view() {
                SampleView::Record(entries) => {
                    let nested = self.record_fields(source.node_id(), entries, &source_path, walk)?;
                    field = field.with_fields(nested);
                }
                other => {
                    return Err(InferenceError::RecordOverrideMismatch {
                        path: source_path,
                        kind: other.kind(),
                    })
                }
            }
        }
        Ok(field)
    }
}

fn first_element<'a, S: Sample<'a>>(value: S, path: &str) -> Result<S> {
    match value.first_item() {
        Some(first) => {
            first.ok_or_else(|| InferenceError::EmptyArrayAmbiguous { path: path.to_string() })
        }
        None => Err(InferenceError::RecordOverrideMismatch {
            path: path.to_string(),
            kind: value.view().kind(),
        }),
    }
}

/// FLOAT only when there is a fractional part, so `3.0` is an INTEGER
fn classify_number(n: &Number) -> FieldType {
    if n.is_i64() || n.is_u64() {
        return FieldType::Integer;
    }
    match n.as_f64() {
        Some(f) if f.fract() != 0.0 => FieldType::Float,
        _ => FieldType::Integer,
    }
}

/// Records on the current recursion path, for cycle and depth checks
struct Walk {
    ancestors: HashSet<usize>,
    max_depth: usize,
}

impl Walk {
    fn new(max_depth: usize) -> Self {
        Self {
            ancestors: HashSet::new(),
            max_depth,
        }
    }

    fn enter(&mut self, node_id: usize, path: &str) -> Result<()> {
        if self.ancestors.contains(&node_id) {
            return Err(InferenceError::CyclicInput { path: path.to_string() });
        }
        // the root record sits at depth 0
        if self.ancestors.len() > self.max_depth {
            return Err(InferenceError::MaxDepthExceeded {
                path: path.to_string(),
                max: self.max_depth,
            });
        }
        self.ancestors.insert(node_id);
        Ok(())
    }

    fn leave(&mut self, node_id: usize) {
        self.ancestors.remove(&node_id);
    }
}

#[cfg(test)]
#[path = "tests/inference.rs"]
mod tests;
