//! Configuration errors.

use thiserror::Error;

use super::ErrorCategory;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting was present but could not be used.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// A required setting was not provided.
    #[error("Missing required setting {key}")]
    Missing { key: String },
}

impl ConfigError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "E_CONFIG_INVALID",
            ConfigError::Missing { .. } => "E_CONFIG_MISSING",
        }
    }
}
