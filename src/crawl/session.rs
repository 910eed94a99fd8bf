//! Bounded, allow-listed, event-driven page visitor.
//!
//! A [`CrawlSession`] fetches pages, runs response observers and element rules
//! against them, and applies the effects handlers record. Follow-up visits
//! requested by a handler run immediately, one level deeper, before the next
//! matched element is handled; the outermost [`CrawlSession::visit`] returns
//! once the whole tree of follow-ups has unwound.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use reqwest::Method;
use tracing::{Instrument, Span, debug, info_span, trace, warn};
use url::Url;

use crate::resolver::ResolutionOptions;
use crate::user_agent::{UserAgentPolicy, default_project_user_agent};

use super::harvest::Harvest;
use super::scope::{
    Effect, Element, HtmlHandler, PageResponse, RequestHandler, ResponseHandler, Rule, Scope,
    ScopeOutput,
};
use super::transport::{OutboundRequest, RawResponse, Transport, TransportSettings};
use super::{CrawlError, CrawlToolkit};

/// Maximum redirect hops followed for a single fetch.
pub const MAX_REDIRECTS: usize = 10;

/// Static shape of a session: where it may go and how deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    label: &'static str,
    allowed_hosts: Vec<String>,
    max_depth: usize,
    send_referer: bool,
    fixed_user_agent: bool,
    include_origin_host: bool,
}

impl SessionConfig {
    /// Allows `hosts` and bounds traversal to `max_depth` hops (entry page = 1).
    #[must_use]
    pub fn new<I, S>(hosts: I, max_depth: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: "adhoc",
            allowed_hosts: hosts.into_iter().map(Into::into).collect(),
            max_depth,
            send_referer: false,
            fixed_user_agent: false,
            include_origin_host: true,
        }
    }

    /// Names the session in its tracing span (usually the strategy key).
    #[must_use]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Sends the triggering page as `Referer` on follow-up visits.
    #[must_use]
    pub fn with_referer(mut self) -> Self {
        self.send_referer = true;
        self
    }

    /// Uses the fixed project User-Agent instead of rotating browser agents.
    #[must_use]
    pub fn with_fixed_user_agent(mut self) -> Self {
        self.fixed_user_agent = true;
        self
    }

    /// Does not add the origin URL's host to the allow-list.
    #[must_use]
    pub fn without_origin_host(mut self) -> Self {
        self.include_origin_host = false;
        self
    }

    /// Configured maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[derive(Debug, Clone)]
struct AllowList {
    hosts: HashSet<String>,
}

impl AllowList {
    fn new(hosts: impl IntoIterator<Item = String>) -> Self {
        Self {
            hosts: hosts
                .into_iter()
                .map(|host| host.trim().trim_end_matches('.').to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        }
    }

    fn permits(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| self.hosts.contains(&host.to_ascii_lowercase()))
    }
}

/// One bounded crawl collecting URLs into a [`Harvest`].
pub struct CrawlSession {
    options: ResolutionOptions,
    transport: Arc<dyn Transport>,
    allow: AllowList,
    max_depth: usize,
    send_referer: bool,
    rules: Vec<Rule>,
    request_observers: Vec<RequestHandler>,
    response_observers: Vec<ResponseHandler>,
    visited: HashSet<String>,
    harvest: Harvest,
    span: Span,
}

impl CrawlSession {
    /// Opens a session for `options` shaped by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::ClientBuild`] if the transport cannot be built.
    pub fn open(
        toolkit: &CrawlToolkit,
        options: ResolutionOptions,
        config: SessionConfig,
    ) -> Result<Self, CrawlError> {
        let mut hosts = config.allowed_hosts;
        if config.include_origin_host
            && let Some(host) = options.origin_host()
        {
            hosts.push(host.to_string());
        }

        let user_agent = if config.fixed_user_agent {
            UserAgentPolicy::Fixed(default_project_user_agent())
        } else {
            toolkit.user_agent_policy()
        };
        let settings = TransportSettings {
            proxy: options.proxy.clone(),
            timeout: options.timeout,
            user_agent,
        };
        let transport = toolkit.connector().connect(&settings)?;
        let span = info_span!("crawl", strategy = config.label, doi = %options.doi);

        Ok(Self {
            options,
            transport,
            allow: AllowList::new(hosts),
            max_depth: config.max_depth,
            send_referer: config.send_referer,
            rules: Vec::new(),
            request_observers: Vec::new(),
            response_observers: Vec::new(),
            visited: HashSet::new(),
            harvest: Harvest::new(),
            span,
        })
    }

    /// The resolution request this session serves.
    #[must_use]
    pub fn options(&self) -> &ResolutionOptions {
        &self.options
    }

    /// Returns true if `url` may be fetched by this session.
    #[must_use]
    pub fn allows(&self, url: &Url) -> bool {
        self.allow.permits(url)
    }

    /// Registers an element rule.
    pub fn on_html<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&Element, &mut Scope<'_>) + Send + Sync + 'static,
    {
        self.rules.push(Rule::new(pattern, handler));
    }

    /// Registers a request observer.
    pub fn on_request<F>(&mut self, handler: F)
    where
        F: Fn(&Url) + Send + Sync + 'static,
    {
        self.request_observers.push(Arc::new(handler));
    }

    /// Registers a response observer.
    pub fn on_response<F>(&mut self, handler: F)
    where
        F: Fn(&PageResponse, &mut Scope<'_>) + Send + Sync + 'static,
    {
        self.response_observers.push(Arc::new(handler));
    }

    /// Collected URLs so far.
    #[must_use]
    pub fn harvest(&self) -> &Harvest {
        &self.harvest
    }

    /// Mutable access for entries added outside handlers.
    pub fn harvest_mut(&mut self) -> &mut Harvest {
        &mut self.harvest
    }

    /// Ends the session, returning what it collected.
    #[must_use]
    pub fn into_harvest(self) -> Harvest {
        self.harvest
    }

    /// Visits `url` as an entry page (depth 1).
    ///
    /// Depth, allow-list and revisit violations are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of the entry page itself. Failures of
    /// follow-up visits are logged and never returned.
    pub async fn visit(&mut self, url: &str) -> Result<(), CrawlError> {
        let span = self.span.clone();
        self.visit_at(url.to_string(), 1, None).instrument(span).await
    }

    /// Resolves `url` through its redirect chain with `HEAD` requests and
    /// returns the final URL, whatever its status. Not bound by the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] for malformed URLs, transport failures or
    /// redirect loops.
    pub async fn resolve_head(&self, url: &str) -> Result<Url, CrawlError> {
        let mut current = Url::parse(url).map_err(|error| CrawlError::invalid_url(url, error))?;
        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .transport
                .send(OutboundRequest {
                    method: &Method::HEAD,
                    url: &current,
                    referer: None,
                })
                .await?;
            match response.location.as_deref() {
                Some(location) if response.is_redirect() => {
                    current = current
                        .join(location)
                        .map_err(|error| CrawlError::invalid_url(location, error))?;
                }
                _ => return Ok(current),
            }
        }
        Err(CrawlError::too_many_redirects(url, MAX_REDIRECTS))
    }

    fn visit_at(
        &mut self,
        raw: String,
        depth: usize,
        referer: Option<Url>,
    ) -> BoxFuture<'_, Result<(), CrawlError>> {
        Box::pin(async move {
            if depth > self.max_depth {
                debug!(url = %raw, depth, max_depth = self.max_depth, "Depth budget exhausted; dropping visit");
                return Ok(());
            }

            let url = Url::parse(&raw).map_err(|error| CrawlError::invalid_url(&raw, error))?;
            if !self.allow.permits(&url) {
                debug!(url = %url, "Host outside allow-list; dropping visit");
                return Ok(());
            }
            if !self.visited.insert(url.to_string()) {
                debug!(url = %url, "Already visited; dropping visit");
                return Ok(());
            }

            for observer in &self.request_observers {
                observer(&url);
            }

            let referer = if self.send_referer { referer } else { None };
            let (final_url, response) = match self.fetch(&url, referer.as_ref()).await {
                Ok(fetched) => fetched,
                Err(error) if error.is_boundary() => {
                    debug!(url = %url, error = %error, "Redirect left the allow-list; dropping visit");
                    return Ok(());
                }
                Err(error) => return Err(error),
            };
            self.visited.insert(final_url.to_string());

            let page = PageResponse {
                url: final_url,
                status: response.status,
                content_type: response.content_type.clone(),
            };
            trace!(url = %page.url, status = page.status, depth, "Processing page");

            let observers = self.response_observers.clone();
            for observer in observers {
                let output = {
                    let mut scope = Scope::new(&self.options, &page.url, depth);
                    observer(&page, &mut scope);
                    scope.finish()
                };
                self.apply(output, &page.url, depth).await;
            }

            if !response.is_html() {
                debug!(url = %page.url, content_type = ?page.content_type, "Non-HTML response; skipping element rules");
                return Ok(());
            }

            for (handler, elements) in self.match_rules(&response.body) {
                for element in elements {
                    let output = {
                        let mut scope = Scope::new(&self.options, &page.url, depth);
                        handler(&element, &mut scope);
                        scope.finish()
                    };
                    self.apply(output, &page.url, depth).await;
                }
            }

            Ok(())
        })
    }

    /// Snapshots matches for the rules registered right now. Rules added by
    /// element handlers of this page only apply to later pages.
    fn match_rules(&self, body: &str) -> Vec<(HtmlHandler, Vec<Element>)> {
        let document = scraper::Html::parse_document(body);
        self.rules
            .iter()
            .map(|rule| (rule.handler(), rule.matches(&document)))
            .filter(|(_, elements)| !elements.is_empty())
            .collect()
    }

    async fn apply(&mut self, output: ScopeOutput, page_url: &Url, depth: usize) {
        self.rules.extend(output.rules);
        self.response_observers.extend(output.observers);

        for effect in output.effects {
            match effect {
                Effect::Push(kind, url) => self.harvest.push(kind, url),
                Effect::ClaimFullText(url) => {
                    if !self.harvest.claim_full_text(url.as_str()) {
                        trace!(url = %url, "Full text already claimed; ignoring candidate");
                    }
                }
                Effect::Visit(url) => {
                    if let Err(error) = self
                        .visit_at(url.clone(), depth + 1, Some(page_url.clone()))
                        .await
                    {
                        warn!(url = %url, error = %error, "Follow-up visit failed");
                    }
                }
                Effect::ResolveHead(kind, url) => match self.resolve_head(&url).await {
                    Ok(final_url) => self.harvest.push(kind, final_url.to_string()),
                    Err(error) => warn!(url = %url, error = %error, "HEAD resolution failed"),
                },
            }
        }
    }

    /// GETs `url`, following redirects while they stay inside the allow-list.
    async fn fetch(
        &self,
        url: &Url,
        referer: Option<&Url>,
    ) -> Result<(Url, RawResponse), CrawlError> {
        let mut current = url.clone();
        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .transport
                .send(OutboundRequest {
                    method: &Method::GET,
                    url: &current,
                    referer,
                })
                .await?;

            if let Some(location) = response.location.as_deref()
                && response.is_redirect()
            {
                let next = current
                    .join(location)
                    .map_err(|error| CrawlError::invalid_url(location, error))?;
                if !self.allow.permits(&next) {
                    return Err(CrawlError::not_allowed(next.as_str()));
                }
                debug!(from = %current, to = %next, "Following redirect");
                current = next;
                continue;
            }

            if !response.is_success() {
                return Err(CrawlError::http_status(current.as_str(), response.status));
            }
            return Ok((current, response));
        }
        Err(CrawlError::too_many_redirects(url.as_str(), MAX_REDIRECTS))
    }
}

impl std::fmt::Debug for CrawlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlSession")
            .field("doi", &self.options.doi)
            .field("max_depth", &self.max_depth)
            .field("rules", &self.rules)
            .field("visited", &self.visited.len())
            .field("harvest", &self.harvest.len())
            .finish_non_exhaustive()
    }
}
