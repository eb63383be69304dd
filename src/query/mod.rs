//! # Query Descriptors
//!
//! Immutable, lazily realized queries against a named remote collection.
//!
//! ```ignore
//! use pundit::query::{merge, Criteria, ExecutionContext, Query};
//!
//! let widgets = Query::from_fn("Widget", loader, ExecutionContext::empty())?;
//! let red = widgets.add_criteria(Criteria::eq("color", json!("red")), merge::shallow);
//! let large_red = red.add_criteria(Criteria::eq("size", json!("L")), merge::shallow);
//!
//! // Nothing has been loaded yet; this invokes the loader.
//! let results = large_red.to_sequence()?;
//! ```

pub mod context;
pub mod criteria;
pub mod descriptor;
pub mod errors;
pub mod loader;
pub mod merge;

pub use context::{Credential, ExecutionContext};
pub use criteria::{Constraint, Criteria};
pub use descriptor::Query;
pub use errors::{BoxError, MergeConflict, QueryError, QueryResult};
pub use loader::{LoadError, Loader};
