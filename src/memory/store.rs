//! In-memory loader
//!
//! Collections of JSON documents behind a shared lock. Clones share the same
//! store, so a test can keep a handle and insert documents after building
//! queries.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::errors::{MemoryError, MemoryResult};
use super::matcher::CompiledCriteria;
use crate::query::{Criteria, ExecutionContext, LoadError, Loader};

type Collections = HashMap<String, Vec<Value>>;

/// Loader backed by in-process collections
#[derive(Clone, Default)]
pub struct InMemoryLoader {
    collections: Arc<RwLock<Collections>>,
    required_key: Option<(String, Value)>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the execution context to carry `name` with exactly `value`
    pub fn require_key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.required_key = Some((name.into(), value.into()));
        self
    }

    /// Append a document to a collection
    pub fn insert(&self, collection: &str, document: Value) -> MemoryResult<()> {
        let mut data = self.collections.write().map_err(|_| MemoryError::Poisoned)?;
        data.entry(collection.to_string()).or_default().push(document);
        Ok(())
    }

    /// Number of documents stored in a collection
    pub fn len(&self, collection: &str) -> MemoryResult<usize> {
        let data = self.collections.read().map_err(|_| MemoryError::Poisoned)?;
        Ok(data.get(collection).map(Vec::len).unwrap_or(0))
    }

    /// Documents of `collection` matching `criteria`, in insertion order.
    ///
    /// Unknown collections yield an empty result.
    pub fn find(
        &self,
        collection: &str,
        context: &ExecutionContext,
        criteria: &Criteria,
    ) -> MemoryResult<Vec<Value>> {
        self.authorize(context)?;
        let compiled = CompiledCriteria::compile(criteria)?;

        let data = self.collections.read().map_err(|_| MemoryError::Poisoned)?;
        let Some(documents) = data.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|doc| compiled.matches(doc))
            .cloned()
            .collect())
    }

    fn authorize(&self, context: &ExecutionContext) -> MemoryResult<()> {
        match &self.required_key {
            Some((name, expected)) if context.lookup(name).as_ref() != Some(expected) => {
                Err(MemoryError::Unauthorized(name.clone()))
            }
            _ => Ok(()),
        }
    }
}

// The required value is a secret; only its name is shown.
impl fmt::Debug for InMemoryLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required_key = self
            .required_key
            .as_ref()
            .map(|(name, _)| format!("{}=<redacted>", name));
        f.debug_struct("InMemoryLoader")
            .field("collections", &self.collections)
            .field("required_key", &required_key)
            .finish()
    }
}

impl Loader for InMemoryLoader {
    type Item = Value;
    type Output = Vec<Value>;

    fn load(
        &self,
        target_id: &str,
        context: &ExecutionContext,
        criteria: &Criteria,
    ) -> Result<Vec<Value>, LoadError> {
        Ok(self.find(target_id, context, criteria)?)
    }
}
