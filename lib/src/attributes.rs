//! Request payload and its validated form.
//!
//! [`PropertyAttributes`] is the loosely typed mapping a caller sends.
//! [`FeatureSchema::validate_attributes`] checks it once, at the boundary, and
//! produces [`ValidatedAttributes`], which every later stage consumes.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{FieldIssue, FieldProblem, ValidationError};
use crate::schema::{FeatureGroup, FeatureSchema};

/// A single raw attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// Explicitly missing, e.g. JSON `null`. Only meaningful for numeric columns.
    Absent,
    Number(f64),
    Bool(bool),
    Text(String),
    /// Arrays and objects; never valid for any column.
    Unsupported,
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttributeValue::Absent,
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map(AttributeValue::Number)
                .unwrap_or(AttributeValue::Unsupported),
            Value::String(s) => AttributeValue::Text(s),
            Value::Array(_) | Value::Object(_) => AttributeValue::Unsupported,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<Option<f64>> for AttributeValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(AttributeValue::Absent, AttributeValue::Number)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Raw request payload: attribute name to value.
///
/// Unknown extra fields are carried along and ignored by validation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "serde_json::Map<String, Value>")]
pub struct PropertyAttributes {
    values: BTreeMap<String, AttributeValue>,
}

impl From<serde_json::Map<String, Value>> for PropertyAttributes {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self {
            values: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for PropertyAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertyAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.remove(name)
    }

    /// True when `name` is absent or explicitly null.
    pub fn is_missing(&self, name: &str) -> bool {
        matches!(self.values.get(name), None | Some(AttributeValue::Absent))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Payload that passed schema validation, split by feature group.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedAttributes {
    pub numeric: HashMap<String, Option<f64>>,
    pub flags: HashMap<String, f64>,
    pub categorical: HashMap<String, String>,
}

fn as_flag(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        AttributeValue::Number(n) if *n == 0.0 || *n == 1.0 => Some(*n),
        _ => None,
    }
}

impl FeatureSchema {
    /// Check that every declared column is present with the right basic type.
    ///
    /// Collects all offending fields before failing. Extra fields are ignored.
    pub fn validate_attributes(
        &self,
        attributes: &PropertyAttributes,
    ) -> Result<ValidatedAttributes, ValidationError> {
        let mut issues = Vec::new();
        let mut validated = ValidatedAttributes {
            numeric: HashMap::with_capacity(self.numeric().len()),
            flags: HashMap::with_capacity(self.flags().len()),
            categorical: HashMap::with_capacity(self.categorical().len()),
        };

        for (group, column) in self.columns() {
            let Some(value) = attributes.get(column) else {
                issues.push(FieldIssue {
                    field: column.to_string(),
                    problem: FieldProblem::Missing,
                });
                continue;
            };

            let problem = match group {
                FeatureGroup::Numeric => match value {
                    AttributeValue::Absent => {
                        validated.numeric.insert(column.to_string(), None);
                        None
                    }
                    AttributeValue::Number(n) => {
                        validated.numeric.insert(column.to_string(), Some(*n));
                        None
                    }
                    _ => Some(FieldProblem::ExpectedNumber),
                },
                FeatureGroup::Flag => match as_flag(value) {
                    Some(flag) => {
                        validated.flags.insert(column.to_string(), flag);
                        None
                    }
                    None => Some(FieldProblem::ExpectedFlag),
                },
                FeatureGroup::Categorical => match value {
                    AttributeValue::Text(text) => {
                        validated
                            .categorical
                            .insert(column.to_string(), text.clone());
                        None
                    }
                    _ => Some(FieldProblem::ExpectedText),
                },
            };

            if let Some(problem) = problem {
                issues.push(FieldIssue {
                    field: column.to_string(),
                    problem,
                });
            }
        }

        if issues.is_empty() {
            Ok(validated)
        } else {
            Err(ValidationError::new(issues))
        }
    }
}
