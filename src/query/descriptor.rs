//! Query Descriptor
//!
//! An immutable snapshot of (target, execution context, criteria) plus the
//! injected loader. Criteria are extended by producing new descriptors;
//! results are produced only when the descriptor is realized.
//!
//! ## Invariants
//! - No operation mutates an existing descriptor
//! - Criteria are never absent (missing criteria become the empty mapping)
//! - Target, context and loader are shared by every derived descriptor
//! - Every realization invokes the loader afresh (no memoization)

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::context::ExecutionContext;
use super::criteria::Criteria;
use super::errors::{BoxError, QueryError, QueryResult};
use super::loader::{share, LoadError, Loader, SharedLoader};
use crate::observability::{Logger, RealizationScope};

/// Deferred query against a named remote collection
pub struct Query<T = Value> {
    target_id: Arc<str>,
    context: Arc<ExecutionContext>,
    criteria: Criteria,
    loader: SharedLoader<T>,
}

impl<T> Query<T> {
    /// Create a descriptor with empty criteria
    pub fn new<L>(
        target_id: impl Into<String>,
        loader: L,
        context: ExecutionContext,
    ) -> QueryResult<Self>
    where
        L: Loader<Item = T> + 'static,
    {
        Self::with_criteria(target_id, loader, context, None)
    }

    /// Create a descriptor with optional initial criteria
    pub fn with_criteria<L>(
        target_id: impl Into<String>,
        loader: L,
        context: ExecutionContext,
        criteria: Option<Criteria>,
    ) -> QueryResult<Self>
    where
        L: Loader<Item = T> + 'static,
    {
        let target_id: String = target_id.into();
        if target_id.trim().is_empty() {
            return Err(QueryError::invalid_argument("target id must not be empty"));
        }

        Ok(Self {
            target_id: target_id.into(),
            context: Arc::new(context),
            criteria: criteria.unwrap_or_default(),
            loader: share(loader),
        })
    }

    /// Create a descriptor from a closure loader
    pub fn from_fn<F, I>(
        target_id: impl Into<String>,
        loader: F,
        context: ExecutionContext,
    ) -> QueryResult<Self>
    where
        F: Fn(&str, &ExecutionContext, &Criteria) -> Result<I, LoadError> + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::new(target_id, loader, context)
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// True if both descriptors hold the same loader instance
    pub fn shares_loader(&self, other: &Query<T>) -> bool {
        Arc::ptr_eq(&self.loader, &other.loader)
    }

    /// True if both descriptors hold the same execution context instance
    pub fn shares_context(&self, other: &Query<T>) -> bool {
        Arc::ptr_eq(&self.context, &other.context)
    }

    /// Derive a descriptor whose criteria are `merge(self.criteria, more)`
    pub fn add_criteria<M>(&self, more: Criteria, merge: M) -> Self
    where
        M: FnOnce(&Criteria, &Criteria) -> Criteria,
    {
        self.derive(merge(&self.criteria, &more))
    }

    /// Derive a descriptor with a fallible merge.
    ///
    /// A merge error is returned as [`QueryError::Merge`] with the original
    /// error as its source.
    pub fn try_add_criteria<M, E>(&self, more: Criteria, merge: M) -> QueryResult<Self>
    where
        M: FnOnce(&Criteria, &Criteria) -> Result<Criteria, E>,
        E: Into<BoxError>,
    {
        match merge(&self.criteria, &more) {
            Ok(criteria) => Ok(self.derive(criteria)),
            Err(e) => {
                let err = QueryError::Merge(e.into());
                Logger::warn(
                    "QUERY_MERGE_FAILED",
                    &[
                        ("code", err.code()),
                        ("reason", err.to_string().as_str()),
                        ("target", self.target_id()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Realize the query by invoking the loader
    pub fn to_sequence(&self) -> QueryResult<Vec<T>> {
        let scope = RealizationScope::begin(self.target_id(), &self.criteria);
        match (self.loader)(self.target_id(), self.context(), &self.criteria) {
            Ok(results) => {
                scope.complete(results.len());
                Ok(results)
            }
            Err(e) => {
                scope.fail(e.code(), &e.to_string());
                Err(e)
            }
        }
    }

    /// Realize the query on the blocking thread pool
    pub async fn to_sequence_async(&self) -> QueryResult<Vec<T>>
    where
        T: Send + 'static,
    {
        let query = self.clone();
        tokio::task::spawn_blocking(move || query.to_sequence())
            .await
            .map_err(|e| QueryError::Realization(Box::new(e)))?
    }

    fn derive(&self, criteria: Criteria) -> Self {
        Self {
            target_id: Arc::clone(&self.target_id),
            context: Arc::clone(&self.context),
            criteria,
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        self.derive(self.criteria.clone())
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("target_id", &self.target_id)
            .field("context", &self.context)
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target_id, self.criteria)
    }
}
