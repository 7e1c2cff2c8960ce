//! Sample values and the view trait the inference engine walks.
//!
//! The engine never looks at a concrete value type directly: it asks for a
//! [`SampleView`] through the [`Sample`] trait. That keeps classification an
//! exhaustive match over one closed set of kinds, whether the sample came from
//! `serde_json`, from [`SampleValue`], or from a caller's own graph type.

use indexmap::IndexMap;
use serde_json::{Number, Value};

/// An owned sample: one concrete data instance used to infer a schema
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Absent,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<SampleValue>),
    Record(IndexMap<String, SampleValue>),
}

impl SampleValue {
    /// Build a record from key/value pairs, keeping their order.
    /// A repeated key keeps its first position and its last value.
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SampleValue)>,
    {
        SampleValue::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        SampleValue::Bytes(data.into())
    }

    /// A finite float; `None` for NaN and infinities, which have no JSON form
    pub fn float(value: f64) -> Option<Self> {
        Number::from_f64(value).map(SampleValue::Number)
    }
}

impl From<Value> for SampleValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SampleValue::Absent,
            Value::Bool(b) => SampleValue::Bool(b),
            Value::Number(n) => SampleValue::Number(n),
            Value::String(s) => SampleValue::String(s),
            Value::Array(items) => {
                SampleValue::Array(items.into_iter().map(SampleValue::from).collect())
            }
            Value::Object(map) => SampleValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, SampleValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for SampleValue {
    fn from(b: bool) -> Self {
        SampleValue::Bool(b)
    }
}

impl From<i64> for SampleValue {
    fn from(n: i64) -> Self {
        SampleValue::Number(n.into())
    }
}

impl From<u64> for SampleValue {
    fn from(n: u64) -> Self {
        SampleValue::Number(n.into())
    }
}

impl From<&str> for SampleValue {
    fn from(s: &str) -> Self {
        SampleValue::String(s.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(s: String) -> Self {
        SampleValue::String(s)
    }
}

impl From<Vec<SampleValue>> for SampleValue {
    fn from(items: Vec<SampleValue>) -> Self {
        SampleValue::Array(items)
    }
}

impl<T: Into<SampleValue>> From<Option<T>> for SampleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SampleValue::Absent, Into::into)
    }
}

/// One step of a sample graph, as seen by the engine
#[derive(Debug, Clone)]
pub enum SampleView<'a, S> {
    Absent,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
    Bytes(&'a [u8]),
    Array(Vec<S>),
    Record(Vec<(&'a str, S)>),
    /// A kind outside the model, named for error reporting
    Unsupported(&'static str),
}

impl<S> SampleView<'_, S> {
    /// Short name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SampleView::Absent => "null",
            SampleView::Bool(_) => "boolean",
            SampleView::Number(_) => "number",
            SampleView::String(_) => "string",
            SampleView::Bytes(_) => "bytes",
            SampleView::Array(_) => "array",
            SampleView::Record(_) => "record",
            SampleView::Unsupported(kind) => *kind,
        }
    }
}

/// A cheap, copyable handle onto a node of a sample graph.
///
/// `node_id` must be stable for the lifetime `'a` and distinct between live
/// nodes; the assembler uses it to notice a record reachable from itself.
pub trait Sample<'a>: Copy {
    fn view(self) -> SampleView<'a, Self>;

    fn node_id(self) -> usize;

    /// First element of an array: `None` when this is not an array,
    /// `Some(None)` when the array is empty
    fn first_item(self) -> Option<Option<Self>> {
        match self.view() {
            SampleView::Array(items) => Some(items.into_iter().next()),
            _ => None,
        }
    }

    fn is_array(self) -> bool {
        self.first_item().is_some()
    }
}

impl<'a> Sample<'a> for &'a SampleValue {
    fn view(self) -> SampleView<'a, Self> {
        match self {
            SampleValue::Absent => SampleView::Absent,
            SampleValue::Bool(b) => SampleView::Bool(*b),
            SampleValue::Number(n) => SampleView::Number(n),
            SampleValue::String(s) => SampleView::String(s),
            SampleValue::Bytes(b) => SampleView::Bytes(b),
            SampleValue::Array(items) => SampleView::Array(items.iter().collect()),
            SampleValue::Record(map) => {
                SampleView::Record(map.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
        }
    }

    fn node_id(self) -> usize {
        self as *const SampleValue as usize
    }

    fn first_item(self) -> Option<Option<Self>> {
        match self {
            SampleValue::Array(items) => Some(items.first()),
            _ => None,
        }
    }

    fn is_array(self) -> bool {
        matches!(self, SampleValue::Array(_))
    }
}

impl<'a> Sample<'a> for &'a Value {
    fn view(self) -> SampleView<'a, Self> {
        match self {
            Value::Null => SampleView::Absent,
            Value::Bool(b) => SampleView::Bool(*b),
            Value::Number(n) => SampleView::Number(n),
            Value::String(s) => SampleView::String(s),
            Value::Array(items) => SampleView::Array(items.iter().collect()),
            Value::Object(map) => {
                SampleView::Record(map.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
        }
    }

    fn node_id(self) -> usize {
        self as *const Value as usize
    }

    fn first_item(self) -> Option<Option<Self>> {
        self.as_array().map(|items| items.first())
    }

    fn is_array(self) -> bool {
        Value::is_array(self)
    }
}
