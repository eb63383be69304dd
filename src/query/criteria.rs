//! # Query Criteria
//!
//! Key-value constraints accumulated on a query descriptor.
//! Keys are unique; ordering is not semantically significant but rendering
//! is deterministic (sorted by key).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::QueryError;

/// Constraint operators understood by document-store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// Less than
    #[serde(rename = "$lt")]
    Lt,

    /// Less than or equal
    #[serde(rename = "$lte")]
    Lte,

    /// Greater than
    #[serde(rename = "$gt")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "$gte")]
    Gte,

    /// Not equal
    #[serde(rename = "$ne")]
    Ne,

    /// Value in list
    #[serde(rename = "$in")]
    In,

    /// Value not in list
    #[serde(rename = "$nin")]
    NotIn,

    /// Field presence (value is a boolean)
    #[serde(rename = "$exists")]
    Exists,

    /// Regular expression match
    #[serde(rename = "$regex")]
    Regex,
}

impl Constraint {
    /// Get the operator key
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Lt => "$lt",
            Constraint::Lte => "$lte",
            Constraint::Gt => "$gt",
            Constraint::Gte => "$gte",
            Constraint::Ne => "$ne",
            Constraint::In => "$in",
            Constraint::NotIn => "$nin",
            Constraint::Exists => "$exists",
            Constraint::Regex => "$regex",
        }
    }

    /// Parse an operator key
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "$lt" => Some(Constraint::Lt),
            "$lte" => Some(Constraint::Lte),
            "$gt" => Some(Constraint::Gt),
            "$gte" => Some(Constraint::Gte),
            "$ne" => Some(Constraint::Ne),
            "$in" => Some(Constraint::In),
            "$nin" => Some(Constraint::NotIn),
            "$exists" => Some(Constraint::Exists),
            "$regex" => Some(Constraint::Regex),
            _ => None,
        }
    }
}

/// Accumulated query criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, Value>);

impl Criteria {
    /// Create empty criteria
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria with a single equality entry
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new().with(field, value)
    }

    /// Criteria with a single operator constraint: `{field: {"$op": value}}`
    pub fn constraint(field: impl Into<String>, op: Constraint, value: Value) -> Self {
        let mut inner = Map::new();
        inner.insert(op.as_str().to_string(), value);
        Self::new().with(field, Value::Object(inner))
    }

    /// Return these criteria with `key` set to `value`
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    /// Render as a JSON object value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for Criteria {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<BTreeMap<String, Value>> for Criteria {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Map<String, Value>> for Criteria {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl TryFrom<Value> for Criteria {
    type Error = QueryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into()),
            other => Err(QueryError::invalid_argument(format!(
                "criteria must be a JSON object, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
