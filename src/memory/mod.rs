//! # In-Memory Loader
//!
//! A reference [`Loader`](crate::query::Loader) that evaluates criteria
//! against JSON documents held in process. Used by tests and demos in place
//! of a remote backend.

pub mod errors;
pub mod matcher;
pub mod store;

pub use errors::{MemoryError, MemoryResult};
pub use store::InMemoryLoader;
