//! Error types for crawl sessions.
//!
//! Follows the What/Why/Fix message pattern used across the project. Most of
//! these never reach a strategy's caller: a failed fetch only ends the visit
//! it belongs to.

use thiserror::Error;

/// Errors that can occur while crawling publisher pages.
#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    /// A URL (visit target, redirect location, attribute value) could not be parsed
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// Network-level failure (DNS, connect, timeout, body read)
    #[error("request to '{url}' failed: {reason}\n  Suggestion: Check network access, proxy and timeout settings")]
    Transport {
        /// The URL being fetched
        url: String,
        /// Underlying client message
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("'{url}' returned HTTP {status}")]
    HttpStatus {
        /// The URL being fetched
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The URL's host is outside the session allow-list
    #[error("'{url}' is outside the session allow-list")]
    NotAllowed {
        /// The rejected URL
        url: String,
    },

    /// Redirect chain exceeded the hop limit
    #[error(
        "too many redirects ({count}) fetching '{url}'\n  Suggestion: Check for circular redirects between publisher hosts"
    )]
    TooManyRedirects {
        /// The originally requested URL
        url: String,
        /// Number of redirects followed
        count: usize,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {reason}\n  Suggestion: {suggestion}")]
    ClientBuild {
        /// Builder message
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The headless render collaborator failed
    #[error("supplementary rendering failed: {reason}")]
    Render {
        /// Why rendering failed
        reason: String,
    },
}

impl CrawlError {
    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `HttpStatus` error.
    #[must_use]
    pub fn http_status(url: &str, status: u16) -> Self {
        Self::HttpStatus {
            url: url.to_string(),
            status,
        }
    }

    /// Creates a `NotAllowed` error.
    #[must_use]
    pub fn not_allowed(url: &str) -> Self {
        Self::NotAllowed {
            url: url.to_string(),
        }
    }

    /// Creates a `TooManyRedirects` error.
    #[must_use]
    pub fn too_many_redirects(url: &str, count: usize) -> Self {
        Self::TooManyRedirects {
            url: url.to_string(),
            count,
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(reason: impl std::fmt::Display) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
            suggestion: "Check the proxy address format (e.g. http://host:port)".to_string(),
        }
    }

    /// Creates a `Render` error.
    #[must_use]
    pub fn render(reason: impl std::fmt::Display) -> Self {
        Self::Render {
            reason: reason.to_string(),
        }
    }

    /// Returns true for expected crawl boundaries that are dropped silently
    /// rather than reported as failures.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::NotAllowed { .. })
    }
}
