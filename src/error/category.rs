//! Error category classification.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, or timeout problems.
    /// Generally transient and retryable.
    Network,

    /// The backend answered with an error status.
    /// Retryable for 5xx, not for 4xx.
    Server,

    /// The backend sent data that does not follow the wire format.
    Protocol,

    /// Missing or invalid settings. Not retryable until corrected.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the agent backend is reachable and try again",
            ErrorCategory::Server => "The agent backend may be having issues. Please try again later",
            ErrorCategory::Protocol => "The agent backend sent unexpected data. Check client and server versions",
            ErrorCategory::Configuration => "Check the AGENTSTREAM_* environment variables",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_categories() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Protocol.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
    }

    #[test]
    fn test_configuration_hint_names_env_vars() {
        assert!(ErrorCategory::Configuration
            .recovery_hint()
            .contains("AGENTSTREAM_"));
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ErrorCategory::Protocol.to_string(), "protocol");
        assert_eq!(format!("{}", ErrorCategory::Network), "network");
    }
}
