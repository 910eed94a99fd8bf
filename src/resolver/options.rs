//! The immutable input of one resolution.

use std::time::Duration;

use url::Url;

use super::ResolveError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL every DOI resolves through.
pub const DOI_RESOLVER_BASE: &str = "https://doi.org";

/// What to resolve and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// The article's DOI (e.g. `10.1038/s41586-020-2012-7`).
    pub doi: String,
    /// Landing page the caller already resolved the DOI to. Its host is added
    /// to the crawl allow-list and relative links are resolved against it.
    pub origin_url: Option<Url>,
    /// Collect the full-text artifact.
    pub full_text: bool,
    /// Collect supplementary attachments.
    pub supplementary: bool,
    /// Upstream proxy address (`http://host:port`, `socks5://...`).
    pub proxy: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ResolutionOptions {
    /// Creates options for `doi` requesting the full text only.
    #[must_use]
    pub fn new(doi: impl Into<String>) -> Self {
        Self {
            doi: doi.into().trim().to_string(),
            origin_url: None,
            full_text: true,
            supplementary: false,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the already-resolved landing page.
    #[must_use]
    pub fn with_origin_url(mut self, origin_url: Url) -> Self {
        self.origin_url = Some(origin_url);
        self
    }

    /// Sets whether the full text is wanted.
    #[must_use]
    pub fn with_full_text(mut self, wanted: bool) -> Self {
        self.full_text = wanted;
        self
    }

    /// Sets whether supplementary attachments are wanted.
    #[must_use]
    pub fn with_supplementary(mut self, wanted: bool) -> Self {
        self.supplementary = wanted;
        self
    }

    /// Sets the upstream proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `https://doi.org/<DOI>`, the universal crawl entry point.
    #[must_use]
    pub fn doi_url(&self) -> String {
        format!("{DOI_RESOLVER_BASE}/{}", self.doi)
    }

    /// Host of the origin URL, if one was given.
    #[must_use]
    pub fn origin_host(&self) -> Option<&str> {
        self.origin_url.as_ref().and_then(Url::host_str)
    }

    /// Checks the invariants a strategy relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidOptions`] for an empty DOI, a zero
    /// timeout or an unparsable proxy address.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.doi.trim().is_empty() {
            return Err(ResolveError::invalid_options(
                "doi",
                "DOI is empty",
                "Pass a DOI such as 10.1038/s41586-020-2012-7",
            ));
        }
        if self.timeout.is_zero() {
            return Err(ResolveError::invalid_options(
                "timeout",
                "timeout must be greater than zero",
                "Use a timeout of at least one second",
            ));
        }
        if let Some(proxy) = self.proxy.as_deref()
            && Url::parse(proxy).is_err()
        {
            return Err(ResolveError::invalid_options(
                "proxy",
                &format!("'{proxy}' is not a valid proxy URL"),
                "Use the form http://host:port or socks5://host:port",
            ));
        }
        Ok(())
    }
}
