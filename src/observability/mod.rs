//! Observability for pundit
//!
//! - Structured logging (one JSON object per line)
//! - Realization scopes with begin, complete, failed and incomplete events
//! - Threshold configuration from the environment
//!
//! Observability is read-only: it never changes the outcome of a
//! merge or a realization.
//!
//! # Usage
//!
//! ```ignore
//! use pundit::observability::{LogConfig, Logger};
//!
//! Logger::configure(&LogConfig::from_env()?);
//! Logger::info("CLIENT_READY", &[("app", "demo")]);
//! ```

mod config;
mod logger;
mod scope;

pub use config::{ConfigError, LogConfig, LOG_ENV_VAR};
pub use logger::{Logger, Severity};
pub use scope::RealizationScope;

#[cfg(test)]
pub(crate) use logger::capture_logs;
