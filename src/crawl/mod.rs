//! Bounded crawling engine used by publisher strategies.
//!
//! # Architecture
//!
//! - [`CrawlSession`] - Visits pages under a depth budget and host allow-list,
//!   dispatching [`Rule`]s and response observers
//! - [`Scope`] - Handler-side view of the current page; records [`Effect`]s
//! - [`Harvest`] - Ordered `(kind, url)` results of one crawl
//! - [`Connector`] / [`Transport`] - HTTP collaborator (real or replayed)
//! - [`SupplementaryRenderer`] - Headless-render collaborator
//! - [`CrawlToolkit`] - Bundle of collaborators handed to every strategy

mod error;
mod harvest;
mod render;
mod replay;
mod scope;
mod session;
mod transport;

pub use error::CrawlError;
pub use harvest::{ArtifactKind, Harvest};
pub use render::{CommandRenderer, NoRenderer, SupplementaryRenderer};
pub use replay::{RecordedRequest, ReplayWeb};
pub use scope::{
    Effect, Element, HtmlHandler, PageResponse, RequestHandler, ResponseHandler, Rule, Scope,
    compile_static_selector,
};
pub use session::{CrawlSession, MAX_REDIRECTS, SessionConfig};
pub use transport::{
    Connector, HttpConnector, HttpTransport, OutboundRequest, RawResponse, Transport,
    TransportSettings,
};

use std::sync::Arc;

use crate::user_agent::{UserAgentPolicy, default_browser_user_agents};

/// Collaborators shared by every crawl: how to reach the network, how to
/// render script-built pages, and which User-Agents to present.
#[derive(Clone)]
pub struct CrawlToolkit {
    connector: Arc<dyn Connector>,
    renderer: Arc<dyn SupplementaryRenderer>,
    user_agents: Vec<String>,
}

impl CrawlToolkit {
    /// Creates a toolkit over `connector` with no renderer and the default
    /// browser User-Agent pool.
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            renderer: Arc::new(NoRenderer),
            user_agents: default_browser_user_agents(),
        }
    }

    /// Toolkit backed by the real network.
    #[must_use]
    pub fn http() -> Self {
        Self::new(Arc::new(HttpConnector))
    }

    /// Replaces the headless renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn SupplementaryRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replaces the rotating User-Agent pool. An empty pool falls back to
    /// the project User-Agent.
    #[must_use]
    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.user_agents = user_agents;
        self
    }

    /// The HTTP connector.
    #[must_use]
    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// The headless renderer.
    #[must_use]
    pub fn renderer(&self) -> &dyn SupplementaryRenderer {
        self.renderer.as_ref()
    }

    /// Rotating policy over the configured pool.
    #[must_use]
    pub fn user_agent_policy(&self) -> UserAgentPolicy {
        UserAgentPolicy::Rotating(self.user_agents.clone())
    }
}

impl Default for CrawlToolkit {
    fn default() -> Self {
        Self::http()
    }
}

impl std::fmt::Debug for CrawlToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlToolkit")
            .field("user_agents", &self.user_agents.len())
            .finish_non_exhaustive()
    }
}
