//! Publisher strategies that turn a DOI into full-text and supplementary URLs.
//!
//! Each strategy knows one publisher's page structure: which hosts a crawl may
//! touch, how deep it may go, and which elements carry the links. Strategies
//! are stateless; every call opens its own [`CrawlSession`](crate::crawl::CrawlSession).
//!
//! # Architecture
//!
//! - [`Strategy`] - Async trait that individual publisher strategies implement
//! - [`StrategyRegistry`] - Keyed collection with the resolution entry point
//! - [`ResolutionOptions`] - Immutable input of one resolution
//! - [`ResolveError`] - Errors surfaced to callers
//!
//! # Example
//!
//! ```no_run
//! use doi_spider::crawl::CrawlToolkit;
//! use doi_spider::resolver::{build_default_strategy_registry, ResolutionOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_strategy_registry();
//! let options = ResolutionOptions::new("10.1038/s41586-020-2012-7").with_supplementary(true);
//! let urls = registry
//!     .resolve("nature", &options, &CrawlToolkit::http())
//!     .await?;
//! for url in urls {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```

mod aacr;
mod aha;
mod aps;
mod ats;
mod blood;
mod bmj;
mod cell;
mod cell_image_library;
mod error;
mod ieee;
mod jama;
mod liebert;
mod lww;
mod nature;
mod nejm;
mod options;
mod registry;
mod sage;
mod science;
mod tandf;
mod utils;

pub use aacr::AacrStrategy;
pub use aha::AhaJournalsStrategy;
pub use aps::ApsStrategy;
pub use ats::AtsJournalsStrategy;
pub use blood::BloodJournalStrategy;
pub use bmj::BmjStrategy;
pub use cell::CellStrategy;
pub use cell_image_library::CellImageLibraryStrategy;
pub use error::ResolveError;
pub use ieee::IeeeStrategy;
pub use jama::JamaStrategy;
pub use liebert::LiebertPubStrategy;
pub use lww::LwwStrategy;
pub use nature::NatureStrategy;
pub use nejm::NejmStrategy;
pub use options::{DEFAULT_TIMEOUT, DOI_RESOLVER_BASE, ResolutionOptions};
pub use registry::StrategyRegistry;
pub use sage::SagePubStrategy;
pub use science::ScienceStrategy;
pub use tandf::TandfonlineStrategy;
pub use utils::{canonical_host, hosts_match};

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

/// Builds the registry with every supported publisher.
///
/// Order is deterministic; [`StrategyRegistry::find_by_host`] prefers
/// earlier strategies for hosts several publishers share.
#[must_use]
pub fn build_default_strategy_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(NatureStrategy));
    registry.register(Box::new(ScienceStrategy));
    registry.register(Box::new(CellStrategy));
    registry.register(Box::new(BloodJournalStrategy));
    registry.register(Box::new(NejmStrategy));
    registry.register(Box::new(AhaJournalsStrategy));
    registry.register(Box::new(JamaStrategy));
    registry.register(Box::new(AacrStrategy));
    registry.register(Box::new(TandfonlineStrategy));
    registry.register(Box::new(BmjStrategy));
    registry.register(Box::new(AtsJournalsStrategy));
    registry.register(Box::new(ApsStrategy));
    registry.register(Box::new(CellImageLibraryStrategy));
    registry.register(Box::new(IeeeStrategy));
    registry.register(Box::new(SagePubStrategy));
    registry.register(Box::new(LwwStrategy));
    registry.register(Box::new(LiebertPubStrategy));
    registry
}

/// Trait that all publisher strategies must implement.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn Strategy>`, which the registry stores.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Stable publisher key (e.g. "nature", "cell").
    fn key(&self) -> &'static str;

    /// Publisher hosts a crawl may visit, besides `doi.org` and the origin host.
    fn hosts(&self) -> &'static [&'static str];

    /// Crawls the publisher's pages for `options.doi`.
    ///
    /// Fetch and parse problems end the crawl early and yield the URLs found
    /// so far; zero results are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] only when the crawl session cannot be set up.
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError>;
}
