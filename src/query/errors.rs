//! # Configuration Errors
//!
//! The only failure class the query engine reports. Everything a client
//! can put in a query string is absorbed; only a caller-supplied
//! configuration can be rejected.

use thiserror::Error;

/// Result type for configuration construction
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `maxLimit` was negative
    #[error("maxLimit must be a non-negative integer, got {0}")]
    InvalidMaxLimit(i64),

    /// A reserved key alias was empty or whitespace
    #[error("Reserved key alias for '{0}' cannot be empty")]
    EmptyAlias(&'static str),

    /// A reserved key has no names left to match
    #[error("Reserved key '{0}' must have at least one name")]
    NoAliases(&'static str),

    /// One name mapped to two different reserved keys
    #[error("Name '{name}' is used by both '{first}' and '{second}'")]
    ConflictingAlias {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    /// Configuration document could not be decoded
    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

impl ConfigError {
    /// Stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidMaxLimit(_) => "Q2DOC_CONFIG_INVALID_MAX_LIMIT",
            ConfigError::EmptyAlias(_) => "Q2DOC_CONFIG_EMPTY_ALIAS",
            ConfigError::NoAliases(_) => "Q2DOC_CONFIG_NO_ALIASES",
            ConfigError::ConflictingAlias { .. } => "Q2DOC_CONFIG_CONFLICTING_ALIAS",
            ConfigError::Malformed(_) => "Q2DOC_CONFIG_MALFORMED",
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}
