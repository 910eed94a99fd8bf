//! Strategy registry keyed by publisher.
//!
//! The [`StrategyRegistry`] maps publisher keys to [`Strategy`] values and is
//! the single entry point callers use to run a resolution.

use tracing::{debug, info, warn};

use crate::crawl::CrawlToolkit;

use super::utils::canonical_host;
use super::{ResolutionOptions, ResolveError, Strategy};

/// A keyed collection of publisher strategies, kept in registration order.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Creates an empty strategy registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Registers a strategy, replacing any previous one with the same key.
    #[tracing::instrument(skip(self, strategy), fields(strategy_key))]
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        tracing::Span::current().record("strategy_key", strategy.key());
        if let Some(slot) = self
            .strategies
            .iter_mut()
            .find(|existing| existing.key() == strategy.key())
        {
            warn!(key = strategy.key(), "Replacing previously registered strategy");
            *slot = strategy;
            return;
        }
        debug!(
            key = strategy.key(),
            hosts = strategy.hosts().len(),
            "Registering strategy"
        );
        self.strategies.push(strategy);
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Looks up a strategy by key (case-insensitive).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn Strategy> {
        let key = key.trim();
        self.strategies
            .iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(key))
            .map(AsRef::as_ref)
    }

    /// Registered keys, in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.key()).collect()
    }

    /// Returns the first registered strategy whose hosts include `host`.
    ///
    /// Hosts compare after canonicalization (`www.` and case ignored). The DOI
    /// resolver host is shared by every strategy and never matches.
    #[must_use]
    pub fn find_by_host(&self, host: &str) -> Option<&dyn Strategy> {
        let wanted = canonical_host(host);
        if wanted.is_empty() || wanted == "doi.org" {
            return None;
        }
        self.strategies
            .iter()
            .find(|strategy| {
                strategy
                    .hosts()
                    .iter()
                    .any(|candidate| canonical_host(candidate) == wanted)
            })
            .map(AsRef::as_ref)
    }

    /// Resolves `options` with the strategy registered under `key` and returns
    /// the collected URLs in emission order.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidOptions` if the options fail validation,
    /// `ResolveError::UnknownPublisher` if no strategy has that key, and
    /// `ResolveError::Session` if the crawl session cannot be set up.
    #[tracing::instrument(skip(self, options, toolkit), fields(doi = %options.doi))]
    pub async fn resolve(
        &self,
        key: &str,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Vec<String>, ResolveError> {
        options.validate()?;
        let strategy = self
            .get(key)
            .ok_or_else(|| ResolveError::unknown_publisher(key))?;

        let harvest = strategy
            .resolve(options, toolkit)
            .await
            .map_err(|error| ResolveError::session(strategy.key(), error))?;

        info!(
            strategy = strategy.key(),
            full_text = harvest.full_text().count(),
            supplementary = harvest.supplementary().count(),
            "Resolution finished"
        );
        Ok(harvest.into_urls())
    }

    /// Resolves `options` with the strategy owning the origin URL's host.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NoStrategyForHost` when the options carry no
    /// origin URL or no strategy claims its host, plus the errors of
    /// [`StrategyRegistry::resolve`].
    pub async fn resolve_by_origin(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Vec<String>, ResolveError> {
        let host = options.origin_host().unwrap_or_default();
        let key = self
            .find_by_host(host)
            .map(|strategy| strategy.key())
            .ok_or_else(|| ResolveError::no_strategy_for_host(host))?;
        self.resolve(key, options, toolkit).await
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategy_count", &self.strategies.len())
            .field("strategies", &self.keys())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
