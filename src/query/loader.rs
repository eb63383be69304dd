//! Loader capability
//!
//! The loader is the external collaborator that actually executes a query.
//! Whatever it returns is drained into a fresh `Vec` on every realization,
//! so a lazy single-use iterator is consumed exactly once per call.

use std::sync::Arc;

use super::context::ExecutionContext;
use super::criteria::Criteria;
use super::errors::{BoxError, QueryError, QueryResult};

/// Error returned by a loader
pub type LoadError = BoxError;

/// Capability that realizes a query against a backend
pub trait Loader: Send + Sync {
    /// Result record type
    type Item;

    /// Sequence or iterable returned by the backend
    type Output: IntoIterator<Item = Self::Item>;

    /// Execute the query for `target_id` under `context` with `criteria`
    fn load(
        &self,
        target_id: &str,
        context: &ExecutionContext,
        criteria: &Criteria,
    ) -> Result<Self::Output, LoadError>;
}

impl<F, I> Loader for F
where
    F: Fn(&str, &ExecutionContext, &Criteria) -> Result<I, LoadError> + Send + Sync,
    I: IntoIterator,
{
    type Item = I::Item;
    type Output = I;

    fn load(
        &self,
        target_id: &str,
        context: &ExecutionContext,
        criteria: &Criteria,
    ) -> Result<I, LoadError> {
        self(target_id, context, criteria)
    }
}

/// Type-erased realizing loader shared by a descriptor and its derivations
pub(crate) type SharedLoader<T> =
    Arc<dyn Fn(&str, &ExecutionContext, &Criteria) -> QueryResult<Vec<T>> + Send + Sync>;

/// Erase a loader, applying the drain-into-`Vec` realization policy.
pub(crate) fn share<L>(loader: L) -> SharedLoader<L::Item>
where
    L: Loader + 'static,
{
    Arc::new(
        move |target_id: &str, context: &ExecutionContext, criteria: &Criteria| {
            loader
                .load(target_id, context, criteria)
                .map(|output| output.into_iter().collect())
                .map_err(QueryError::Realization)
        },
    )
}
