//! DOI Spider Library
//!
//! Resolves a DOI into the download URLs of the article's full text and its
//! supplementary material by crawling the publisher's pages with a
//! per-publisher strategy.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`crawl`] - Bounded crawl session, HTTP transport and result harvest
//! - [`resolver`] - Publisher strategies and the strategy registry
//! - [`link`] - Normalization of scraped hrefs into absolute URLs
//! - [`user_agent`] - User-Agent pool and selection policy

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod link;
pub mod resolver;
pub mod user_agent;

// Re-export commonly used types
pub use crawl::{
    ArtifactKind, CommandRenderer, CrawlError, CrawlSession, CrawlToolkit, Harvest, NoRenderer,
    SessionConfig, SupplementaryRenderer,
};
pub use link::normalize_link;
pub use resolver::{
    ResolutionOptions, ResolveError, Strategy, StrategyRegistry, build_default_strategy_registry,
};
pub use user_agent::UserAgentPolicy;
