//! Extraction rules and the handler-side view of a crawl.
//!
//! Handlers never touch the session directly. They receive a [`Scope`] and
//! record [`Effect`]s (collected URLs, follow-up visits, HEAD resolutions)
//! which the session applies in order as soon as the handler returns. This
//! keeps re-entrant visiting explicit while preserving the order a
//! synchronous callback crawler would produce.

use std::fmt;
use std::sync::Arc;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::link::normalize_link;
use crate::resolver::ResolutionOptions;

use super::harvest::ArtifactKind;

/// Handler invoked for every element matched by a [`Rule`].
pub type HtmlHandler = Arc<dyn Fn(&Element, &mut Scope<'_>) + Send + Sync>;

/// Handler invoked once per successfully fetched page, before element rules.
pub type ResponseHandler = Arc<dyn Fn(&PageResponse, &mut Scope<'_>) + Send + Sync>;

/// Handler invoked before every request (diagnostics only).
pub type RequestHandler = Arc<dyn Fn(&Url) + Send + Sync>;

/// Compiles a selector literal; panics on an invalid pattern.
#[must_use]
pub fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e:?}"))
}

/// A selector bound to a handler.
#[derive(Clone)]
pub struct Rule {
    selector: Selector,
    pattern: String,
    handler: HtmlHandler,
}

impl Rule {
    /// Creates a rule from a selector literal.
    pub fn new<F>(pattern: &str, handler: F) -> Self
    where
        F: Fn(&Element, &mut Scope<'_>) + Send + Sync + 'static,
    {
        Self {
            selector: compile_static_selector(pattern),
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        }
    }

    /// The selector source text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn handler(&self) -> HtmlHandler {
        Arc::clone(&self.handler)
    }

    /// Snapshots every element of `document` matching this rule, in document order.
    pub(crate) fn matches(&self, document: &scraper::Html) -> Vec<Element> {
        document
            .select(&self.selector)
            .map(Element::from_ref)
            .collect()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Owned snapshot of a matched HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            name: value.name().to_string(),
            attrs: value
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            text: element.text().collect::<String>().trim().to_string(),
        }
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by (case-insensitive) name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Response metadata given to response observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// Final URL after the session followed redirects.
    pub url: Url,
    /// Final HTTP status.
    pub status: u16,
    /// `Content-Type`, if sent.
    pub content_type: Option<String>,
}

/// Side effects requested by a handler, applied in order after it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a URL.
    Push(ArtifactKind, String),
    /// Append a full-text URL only if none was collected yet.
    ClaimFullText(String),
    /// Fetch and process another page one level deeper.
    Visit(String),
    /// HEAD-resolve a tracking URL and append its final location.
    ResolveHead(ArtifactKind, String),
}

/// What a handler produced, handed back to the session.
#[derive(Default)]
pub(crate) struct ScopeOutput {
    pub(crate) effects: Vec<Effect>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) observers: Vec<ResponseHandler>,
}

/// Handler-side view of the page being processed.
pub struct Scope<'s> {
    options: &'s ResolutionOptions,
    page_url: &'s Url,
    depth: usize,
    output: ScopeOutput,
}

impl<'s> Scope<'s> {
    pub(crate) fn new(options: &'s ResolutionOptions, page_url: &'s Url, depth: usize) -> Self {
        Self {
            options,
            page_url,
            depth,
            output: ScopeOutput::default(),
        }
    }

    pub(crate) fn finish(self) -> ScopeOutput {
        self.output
    }

    /// The resolution request driving this crawl.
    #[must_use]
    pub fn options(&self) -> &ResolutionOptions {
        self.options
    }

    /// Final URL of the page being processed.
    #[must_use]
    pub fn page_url(&self) -> &Url {
        self.page_url
    }

    /// Host of the page being processed.
    #[must_use]
    pub fn page_host(&self) -> &str {
        self.page_url.host_str().unwrap_or_default()
    }

    /// Host of the caller-supplied origin URL, falling back to the page host.
    #[must_use]
    pub fn origin_or_page_host(&self) -> &str {
        self.options
            .origin_url
            .as_ref()
            .and_then(Url::host_str)
            .unwrap_or_else(|| self.page_host())
    }

    /// Depth of the page being processed (the entry page is depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Normalizes `href` against the origin URL, or the current page when no
    /// origin was given.
    #[must_use]
    pub fn normalize(&self, href: &str) -> Option<String> {
        let base = self.options.origin_url.as_ref().unwrap_or(self.page_url);
        normalize_link(href, base)
    }

    /// Appends a full-text URL.
    pub fn push_full_text(&mut self, url: impl Into<String>) {
        self.output
            .effects
            .push(Effect::Push(ArtifactKind::FullText, url.into()));
    }

    /// Appends a full-text URL unless one was already collected.
    pub fn claim_full_text(&mut self, url: impl Into<String>) {
        self.output.effects.push(Effect::ClaimFullText(url.into()));
    }

    /// Appends a supplementary URL.
    pub fn push_supplementary(&mut self, url: impl Into<String>) {
        self.output
            .effects
            .push(Effect::Push(ArtifactKind::Supplementary, url.into()));
    }

    /// Schedules a follow-up visit one level deeper than the current page.
    pub fn visit(&mut self, url: impl Into<String>) {
        self.output.effects.push(Effect::Visit(url.into()));
    }

    /// Schedules a HEAD resolution whose final URL is appended as `kind`.
    pub fn resolve_head(&mut self, kind: ArtifactKind, url: impl Into<String>) {
        self.output
            .effects
            .push(Effect::ResolveHead(kind, url.into()));
    }

    /// Registers a rule for pages processed from now on.
    pub fn on_html<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&Element, &mut Scope<'_>) + Send + Sync + 'static,
    {
        self.output.rules.push(Rule::new(pattern, handler));
    }

    /// Registers a response observer for pages processed from now on.
    pub fn on_response<F>(&mut self, handler: F)
    where
        F: Fn(&PageResponse, &mut Scope<'_>) + Send + Sync + 'static,
    {
        self.output.observers.push(Arc::new(handler));
    }

    /// Effects recorded so far (inspection in tests).
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.output.effects
    }
}
