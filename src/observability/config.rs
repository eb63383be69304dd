//! Logging configuration
//!
//! Read from the `PUNDIT_LOG` environment variable:
//! `off`, `trace`, `info`, `warn`, `error` or `fatal`.

use std::env::{self, VarError};

use thiserror::Error;

use super::logger::Severity;

/// Environment variable holding the log level
pub const LOG_ENV_VAR: &str = "PUNDIT_LOG";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unknown log level name
    #[error("Invalid log level '{0}' (expected off, trace, info, warn, error or fatal)")]
    InvalidLevel(String),
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled at all
    pub enabled: bool,
    /// Events below this severity are dropped
    pub min_severity: Severity,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_severity: Severity::Info,
        }
    }
}

impl LogConfig {
    /// Logging disabled
    pub fn off() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Logging enabled at the given threshold
    pub fn at(min_severity: Severity) -> Self {
        Self {
            enabled: true,
            min_severity,
        }
    }

    /// Parse a level name (`off` disables logging)
    pub fn parse(level: &str) -> Result<Self, ConfigError> {
        if level.trim().eq_ignore_ascii_case("off") {
            return Ok(Self::off());
        }
        Severity::parse(level)
            .map(Self::at)
            .ok_or_else(|| ConfigError::InvalidLevel(level.to_string()))
    }

    /// Load from `PUNDIT_LOG`, falling back to the default when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(LOG_ENV_VAR) {
            Ok(level) => Self::from_value(Some(&level)),
            Err(VarError::NotPresent) => Self::from_value(None),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidLevel(
                raw.to_string_lossy().into_owned(),
            )),
        }
    }

    /// Configuration for an optional level name; `None` yields the default
    pub fn from_value(level: Option<&str>) -> Result<Self, ConfigError> {
        level.map_or_else(|| Ok(Self::default()), Self::parse)
    }

    /// Whether an event at `severity` passes this configuration
    pub fn allows(&self, severity: Severity) -> bool {
        self.enabled && severity >= self.min_severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_info() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.min_severity, Severity::Info);
        assert!(!config.allows(Severity::Trace));
        assert!(config.allows(Severity::Warn));
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogConfig::parse("trace").unwrap(), LogConfig::at(Severity::Trace));
        assert_eq!(LogConfig::parse("ERROR").unwrap(), LogConfig::at(Severity::Error));
        assert_eq!(LogConfig::parse("off").unwrap(), LogConfig::off());
    }

    #[test]
    fn test_parse_invalid_level() {
        assert_eq!(
            LogConfig::parse("loud"),
            Err(ConfigError::InvalidLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_from_value() {
        assert_eq!(LogConfig::from_value(None).unwrap(), LogConfig::default());
        assert_eq!(LogConfig::from_value(Some("warn")).unwrap(), LogConfig::at(Severity::Warn));
        assert_eq!(LogConfig::from_value(Some("Off")).unwrap(), LogConfig::off());
        assert_eq!(
            LogConfig::from_value(Some("")),
            Err(ConfigError::InvalidLevel(String::new()))
        );
    }

    // The only test in the crate that touches PUNDIT_LOG.
    #[test]
    fn test_from_env_reads_variable() {
        let previous = env::var_os(LOG_ENV_VAR);

        env::remove_var(LOG_ENV_VAR);
        assert_eq!(LogConfig::from_env().unwrap(), LogConfig::default());

        env::set_var(LOG_ENV_VAR, "error");
        assert_eq!(LogConfig::from_env().unwrap(), LogConfig::at(Severity::Error));

        env::set_var(LOG_ENV_VAR, "loud");
        assert_eq!(
            LogConfig::from_env(),
            Err(ConfigError::InvalidLevel("loud".to_string()))
        );

        match previous {
            Some(value) => env::set_var(LOG_ENV_VAR, value),
            None => env::remove_var(LOG_ENV_VAR),
        }
    }

    #[test]
    fn test_off_allows_nothing() {
        let config = LogConfig::off();
        assert!(!config.allows(Severity::Fatal));
    }
}
