//! RealizationScope for begin/complete logging around a loader call
//!
//! - Logs `QUERY_REALIZE_BEGIN` (TRACE) on creation; criteria are only
//!   rendered when TRACE is enabled
//! - Logs `QUERY_REALIZE_COMPLETE` (TRACE) on `complete()`
//! - Logs `QUERY_REALIZE_FAILED` (WARN) on `fail()`
//! - Logs `QUERY_REALIZE_INCOMPLETE` (WARN) if dropped unfinished (e.g. loader panic)

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::time::Instant;

use uuid::Uuid;

use super::logger::{Logger, Severity};

/// Scope covering a single realization
pub struct RealizationScope {
    realization_id: OnceCell<String>,
    target: String,
    completed: Cell<bool>,
    started_at: Instant,
}

impl RealizationScope {
    /// Open a scope for realizing `target` with `criteria`
    pub fn begin(target: &str, criteria: &dyn fmt::Display) -> Self {
        let scope = Self {
            realization_id: OnceCell::new(),
            target: target.to_string(),
            completed: Cell::new(false),
            started_at: Instant::now(),
        };

        if Logger::is_enabled(Severity::Trace) {
            let criteria = criteria.to_string();
            Logger::trace(
                "QUERY_REALIZE_BEGIN",
                &[
                    ("criteria", criteria.as_str()),
                    ("realization_id", scope.realization_id()),
                    ("target", target),
                ],
            );
        }
        scope
    }

    /// Correlation id, generated on first use
    pub fn realization_id(&self) -> &str {
        self.realization_id.get_or_init(|| Uuid::new_v4().to_string())
    }

    /// Mark the realization as successful
    pub fn complete(self, count: usize) {
        self.completed.set(true);
        if !Logger::is_enabled(Severity::Trace) {
            return;
        }
        let count = count.to_string();
        let elapsed = self.elapsed_ms();
        Logger::trace(
            "QUERY_REALIZE_COMPLETE",
            &[
                ("count", count.as_str()),
                ("elapsed_ms", elapsed.as_str()),
                ("realization_id", self.realization_id()),
                ("target", self.target.as_str()),
            ],
        );
    }

    /// Mark the realization as failed
    pub fn fail(self, code: &str, reason: &str) {
        self.completed.set(true);
        let elapsed = self.elapsed_ms();
        Logger::warn(
            "QUERY_REALIZE_FAILED",
            &[
                ("code", code),
                ("elapsed_ms", elapsed.as_str()),
                ("reason", reason),
                ("realization_id", self.realization_id()),
                ("target", self.target.as_str()),
            ],
        );
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    fn elapsed_ms(&self) -> String {
        self.started_at.elapsed().as_millis().to_string()
    }
}

impl Drop for RealizationScope {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                "QUERY_REALIZE_INCOMPLETE",
                &[
                    ("realization_id", self.realization_id()),
                    ("target", self.target.as_str()),
                ],
            );
        }
    }
}
