//! Checking sample values against an existing schema.
//!
//! Validation never feeds back into inference: a [`Validator`] takes a schema
//! (inferred or hand-written) and reports every place a value disagrees with
//! it. An empty report means no issues were found.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use serde_json::Number;
use thiserror::Error;
use tracing::debug;

use crate::error::{InferenceError, Result};
use crate::field::{FieldDescriptor, FieldMode, FieldType, Schema};
use crate::patterns::Patterns;
use crate::sample::{Sample, SampleView};

const ROOT_PATH: &str = "$";

/// Whether `year-month-day` names a real calendar day.
///
/// Years run 1-9999. Every year divisible by 4 is treated as a leap year.
pub fn is_valid_calendar_date(year: i32, month: u32, day: u32) -> bool {
    if !(1..=9999).contains(&year) {
        return false;
    }
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

/// What is wrong with a value
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchKind {
    #[error("required field is missing or null")]
    MissingRequired,
    #[error("expected an array for a REPEATED field, found {found}")]
    ExpectedArray { found: &'static str },
    #[error("unexpected array for a non-REPEATED field")]
    UnexpectedArray,
    #[error("null element in a REPEATED field")]
    NullElement,
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: FieldType,
        found: &'static str,
    },
    #[error("`{value}` is not a calendar date")]
    InvalidCalendarDate { value: String },
    #[error("field is not declared in the schema")]
    UnknownField,
    #[error("expected a record, found {found}")]
    NotARecord { found: &'static str },
}

/// One disagreement between a value and the schema, located by path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub path: String,
    #[serde(flatten)]
    pub kind: MismatchKind,
}

impl Mismatch {
    fn new(path: impl Into<String>, kind: MismatchKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    patterns: Patterns,
}

impl Validator {
    /// Fails with [`InferenceError::InvalidSchema`] when a RECORD lacks `fields`,
    /// a non-RECORD has them, or two siblings share a name.
    pub fn new(schema: Schema) -> Result<Self> {
        check_schema(&schema, ROOT_PATH)?;
        Ok(Self {
            schema,
            patterns: Patterns::compile()?,
        })
    }

    pub fn schema(&self) -> &[FieldDescriptor] {
        &self.schema
    }

    pub fn validate<'a, S: Sample<'a>>(&self, value: S) -> Vec<Mismatch> {
        let mut report = Vec::new();
        match value.view() {
            SampleView::Record(entries) => {
                self.check_record(&self.schema, entries, ROOT_PATH, &mut report)
            }
            other => report.push(Mismatch::new(
                ROOT_PATH,
                MismatchKind::NotARecord {
                    found: other.kind(),
                },
            )),
        }
        debug!(mismatches = report.len(), "validated sample");
        report
    }

    fn check_record<'a, S: Sample<'a>>(
        &self,
        fields: &[FieldDescriptor],
        entries: Vec<(&'a str, S)>,
        path: &str,
        report: &mut Vec<Mismatch>,
    ) {
        let by_name: HashMap<&str, S> = entries.iter().copied().collect();
        for field in fields {
            let field_path = format!("{path}.{}", field.name);
            self.check_field(field, by_name.get(field.name.as_str()).copied(), &field_path, report);
        }
        for (key, _) in &entries {
            if !fields.iter().any(|field| field.name == *key) {
                report.push(Mismatch::new(format!("{path}.{key}"), MismatchKind::UnknownField));
            }
        }
    }

    fn check_field<'a, S: Sample<'a>>(
        &self,
        field: &FieldDescriptor,
        value: Option<S>,
        path: &str,
        report: &mut Vec<Mismatch>,
    ) {
        let view = match value {
            Some(value) => value.view(),
            None => SampleView::Absent,
        };
        match (field.mode, view) {
            (FieldMode::Required, SampleView::Absent) => {
                report.push(Mismatch::new(path, MismatchKind::MissingRequired))
            }
            // a null REPEATED field is an empty one
            (_, SampleView::Absent) => {}
            (FieldMode::Repeated, SampleView::Array(items)) => {
                for (i, item) in items.into_iter().enumerate() {
                    let item_path = format!("{path}[{i}]");
                    match item.view() {
                        SampleView::Absent => {
                            report.push(Mismatch::new(item_path, MismatchKind::NullElement))
                        }
                        view => self.check_value(field, view, &item_path, report),
                    }
                }
            }
            (FieldMode::Repeated, other) => report.push(Mismatch::new(
                path,
                MismatchKind::ExpectedArray {
                    found: other.kind(),
                },
            )),
            (_, SampleView::Array(_)) => {
                report.push(Mismatch::new(path, MismatchKind::UnexpectedArray))
            }
            (_, view) => self.check_value(field, view, path, report),
        }
    }

    fn check_value<'a, S: Sample<'a>>(
        &self,
        field: &FieldDescriptor,
        view: SampleView<'a, S>,
        path: &str,
        report: &mut Vec<Mismatch>,
    ) {
        match (field.field_type, view) {
            (FieldType::Record, SampleView::Record(entries)) => {
                let nested = field.fields.as_deref().unwrap_or_default();
                self.check_record(nested, entries, path, report);
            }
            (FieldType::Date, SampleView::String(s)) if self.patterns.is_date(s) => {
                if !parse_date(s).is_some_and(|(y, m, d)| is_valid_calendar_date(y, m, d)) {
                    report.push(Mismatch::new(
                        path,
                        MismatchKind::InvalidCalendarDate {
                            value: s.to_string(),
                        },
                    ));
                }
            }
            (expected, view) => {
                if !self.is_scalar_match(expected, &view) {
                    report.push(Mismatch::new(
                        path,
                        MismatchKind::TypeMismatch {
                            expected,
                            found: view.kind(),
                        },
                    ));
                }
            }
        }
    }

    fn is_scalar_match<S>(&self, expected: FieldType, view: &SampleView<'_, S>) -> bool {
        match (expected, view) {
            (FieldType::String, SampleView::String(_)) => true,
            // bytes travel as (base64) text in JSON
            (FieldType::Bytes, SampleView::Bytes(_) | SampleView::String(_)) => true,
            (FieldType::Integer, SampleView::Number(n)) => is_whole(n),
            (FieldType::Float, SampleView::Number(_)) => true,
            (FieldType::Boolean, SampleView::Bool(_)) => true,
            (FieldType::Time, SampleView::String(s)) => self.patterns.is_time(s),
            (FieldType::Datetime, SampleView::String(s)) => self.patterns.is_datetime(s),
            (FieldType::Timestamp, SampleView::String(s)) => self.patterns.is_timestamp(s),
            _ => false,
        }
    }
}

/// Validate one value against a schema in a single call
pub fn validate<'a, S: Sample<'a>>(schema: Schema, value: S) -> Result<Vec<Mismatch>> {
    Ok(Validator::new(schema)?.validate(value))
}

fn is_whole(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Split a string already matched by the date pattern into its parts
fn parse_date(value: &str) -> Option<(i32, u32, u32)> {
    let mut parts = value.splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    Some((year, month, day))
}

fn check_schema(fields: &[FieldDescriptor], path: &str) -> Result<()> {
    let mut names = HashSet::new();
    for field in fields {
        let field_path = format!("{path}.{}", field.name);
        if !names.insert(field.name.as_str()) {
            return Err(InferenceError::InvalidSchema {
                path: field_path,
                reason: "duplicate field name".to_string(),
            });
        }
        match (&field.fields, field.is_record()) {
            (Some(nested), true) => check_schema(nested, &field_path)?,
            (None, true) => {
                return Err(InferenceError::InvalidSchema {
                    path: field_path,
                    reason: "RECORD field has no `fields`".to_string(),
                })
            }
            (Some(_), false) => {
                return Err(InferenceError::InvalidSchema {
                    path: field_path,
                    reason: format!("{} field must not have `fields`", field.field_type),
                })
            }
            (None, false) => {}
        }
    }
    Ok(())
}
