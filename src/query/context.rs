//! Execution Context
//!
//! Authorization/session payload forwarded verbatim to the loader.
//! The descriptor never inspects it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque execution context carried by every query descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Key-value session data (application id, session token, ...)
    Map(BTreeMap<String, Value>),

    /// Ordered credential entries
    Credentials(Vec<Credential>),
}

impl ExecutionContext {
    /// Create an empty map context
    pub fn empty() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Create a map context from key-value pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create a credential-sequence context
    pub fn credentials(entries: Vec<Credential>) -> Self {
        Self::Credentials(entries)
    }

    /// Look up an entry by key in either variant.
    ///
    /// For credential sequences the first entry with a matching name wins.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        match self {
            Self::Map(map) => map.get(key).cloned(),
            Self::Credentials(creds) => creds
                .iter()
                .find(|c| c.name == key)
                .map(|c| Value::String(c.secret.clone())),
        }
    }

    /// Returns true if the context carries no entries
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Map(map) => map.is_empty(),
            Self::Credentials(creds) => creds.is_empty(),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single named credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub secret: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
        }
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}
