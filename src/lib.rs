//! pundit - Immutable, lazily realized query descriptors
//!
//! A [`Query`](query::Query) accumulates criteria against a named remote
//! collection and defers execution to an injected loader until it is
//! realized.

pub mod memory;
pub mod observability;
pub mod query;

pub use query::{Criteria, ExecutionContext, Query, QueryError, QueryResult};
