//! Error types for strategy resolution.
//!
//! Follows the What/Why/Fix pattern used across the project.

use thiserror::Error;

use crate::crawl::CrawlError;

/// Errors that can occur while resolving a DOI through a publisher strategy.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The resolution options are unusable
    #[error("invalid option '{field}': {reason}\n  Suggestion: {suggestion}")]
    InvalidOptions {
        /// Offending option
        field: String,
        /// Why it was rejected
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// No strategy is registered under the requested key
    #[error(
        "unknown publisher '{publisher}'\n  Suggestion: Run with --list-publishers to see supported publisher keys"
    )]
    UnknownPublisher {
        /// The requested key
        publisher: String,
    },

    /// No strategy claims the host of the given URL
    #[error("no publisher strategy handles host '{host}'\n  Suggestion: {suggestion}")]
    NoStrategyForHost {
        /// The unmatched host
        host: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The crawl session could not be set up
    #[error("crawl session for '{publisher}' failed: {source}")]
    Session {
        /// Strategy key
        publisher: String,
        /// Underlying crawl error
        #[source]
        source: CrawlError,
    },
}

impl ResolveError {
    /// Creates an `InvalidOptions` error.
    #[must_use]
    pub fn invalid_options(field: &str, reason: &str, suggestion: &str) -> Self {
        Self::InvalidOptions {
            field: field.to_string(),
            reason: reason.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates an `UnknownPublisher` error.
    #[must_use]
    pub fn unknown_publisher(publisher: &str) -> Self {
        Self::UnknownPublisher {
            publisher: publisher.to_string(),
        }
    }

    /// Creates a `NoStrategyForHost` error.
    #[must_use]
    pub fn no_strategy_for_host(host: &str) -> Self {
        Self::NoStrategyForHost {
            host: host.to_string(),
            suggestion: "Pass --publisher explicitly or check the landing-page URL".to_string(),
        }
    }

    /// Wraps a session setup failure.
    #[must_use]
    pub fn session(publisher: &str, source: CrawlError) -> Self {
        Self::Session {
            publisher: publisher.to_string(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_options_message() {
        let err = ResolveError::invalid_options("timeout", "must be positive", "Use 30");
        let msg = err.to_string();
        assert!(msg.contains("timeout"), "should name the field");
        assert!(msg.contains("must be positive"), "should contain reason");
        assert!(msg.contains("Suggestion: Use 30"), "should have suggestion");
    }

    #[test]
    fn test_unknown_publisher_message() {
        let msg = ResolveError::unknown_publisher("elsevier-classic").to_string();
        assert!(msg.contains("elsevier-classic"));
        assert!(msg.contains("--list-publishers"));
    }

    #[test]
    fn test_no_strategy_for_host_message() {
        let msg = ResolveError::no_strategy_for_host("example.org").to_string();
        assert!(msg.contains("example.org"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_session_error_keeps_source() {
        let err = ResolveError::session("nature", CrawlError::client_build("bad proxy"));
        assert!(err.to_string().contains("nature"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
