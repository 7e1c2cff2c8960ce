use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::field::FieldType;

/// Default limit on record nesting before inference gives up
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaInferenceConfig {
    /// Force the type of every field with this name, at any nesting depth,
    /// e.g. `{"created": "TIMESTAMP"}`
    pub types: Option<HashMap<String, FieldType>>,
    /// Field names forced to REQUIRED mode. Array-valued fields stay REPEATED.
    pub required: Option<RequiredFields>,
    /// Maximum number of nested records; `None` means [`DEFAULT_MAX_DEPTH`]
    pub max_depth: Option<usize>,
}

impl SchemaInferenceConfig {
    pub fn with_type(mut self, field: impl Into<String>, field_type: FieldType) -> Self {
        self.types
            .get_or_insert_with(HashMap::new)
            .insert(field.into(), field_type);
        self
    }

    pub fn with_required(mut self, field: impl Into<String>) -> Self {
        self.required
            .get_or_insert_with(RequiredFields::default)
            .insert(field);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Set of field names forced to REQUIRED.
///
/// Deserialises from either a list of names (`["id", "ts"]`) or a map of
/// flags (`{"id": true, "ts": false}`), in which only `true` entries count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequiredFields(HashSet<String>);

impl RequiredFields {
    pub fn insert(&mut self, field: impl Into<String>) {
        self.0.insert(field.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RequiredFields(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for RequiredFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<String>),
            Flags(HashMap<String, bool>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::List(names) => names.into_iter().collect(),
            Repr::Flags(flags) => flags
                .into_iter()
                .filter_map(|(name, required)| required.then_some(name))
                .collect(),
        })
    }
}

/// Configuration with every default filled in, fixed for the generator's lifetime
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    types: HashMap<String, FieldType>,
    required: RequiredFields,
    max_depth: usize,
}

impl ResolvedConfig {
    pub fn resolve(config: SchemaInferenceConfig) -> Self {
        Self {
            types: config.types.unwrap_or_default(),
            required: config.required.unwrap_or_default(),
            max_depth: config.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }

    pub fn type_override(&self, key: &str) -> Option<FieldType> {
        self.types.get(key).copied()
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.contains(key)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
