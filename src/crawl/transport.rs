//! Transport collaborator: single HTTP exchanges without redirect following.
//!
//! The session follows redirects itself so every hop is checked against its
//! allow-list. [`HttpConnector`] is the production implementation over
//! `reqwest`; [`super::ReplayWeb`] replays canned pages for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Proxy};
use tracing::trace;
use url::Url;

use crate::user_agent::UserAgentPolicy;

use super::CrawlError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// One request issued by a session.
#[derive(Debug, Clone, Copy)]
pub struct OutboundRequest<'a> {
    /// `GET` for page visits, `HEAD` for redirect resolution.
    pub method: &'a Method,
    /// Absolute target URL.
    pub url: &'a Url,
    /// Page that triggered this request, when the session sends referers.
    pub referer: Option<&'a Url>,
}

/// Response to a single exchange; redirects are surfaced, not followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Location` header value, if any.
    pub location: Option<String>,
    /// `Content-Type` header value, if any.
    pub content_type: Option<String>,
    /// Response body (empty for `HEAD`).
    pub body: String,
}

impl RawResponse {
    /// A `200 text/html` response.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            location: None,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    /// A `302` response pointing at `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            location: Some(location.into()),
            content_type: None,
            body: String::new(),
        }
    }

    /// An empty response with the given status.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            location: None,
            content_type: None,
            body: String::new(),
        }
    }

    /// Returns true for 3xx responses carrying a `Location`.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.location.is_some()
    }

    /// Returns true for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the body should be parsed as HTML.
    ///
    /// A missing content type is treated as HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().is_none_or(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("html") || value.contains("xml")
        })
    }
}

/// Performs single HTTP exchanges for a crawl session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request. Must not follow redirects.
    async fn send(&self, request: OutboundRequest<'_>) -> Result<RawResponse, CrawlError>;
}

/// Per-session transport settings derived from the resolution request.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Upstream proxy address.
    pub proxy: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// User-Agent choice per request.
    pub user_agent: UserAgentPolicy,
}

/// Builds a transport for one session.
pub trait Connector: Send + Sync {
    /// Creates a transport configured with `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::ClientBuild`] when the transport cannot be built.
    fn connect(&self, settings: &TransportSettings) -> Result<Arc<dyn Transport>, CrawlError>;
}

/// Production connector creating one `reqwest` client per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, settings: &TransportSettings) -> Result<Arc<dyn Transport>, CrawlError> {
        Ok(Arc::new(HttpTransport::new(settings)?))
    }
}

/// `reqwest`-backed transport with a per-session cookie store.
pub struct HttpTransport {
    client: Client,
    user_agent: UserAgentPolicy,
}

impl HttpTransport {
    /// Builds the client: no redirect following, cookies, gzip, timeouts, proxy.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::ClientBuild`] for an invalid proxy or client failure.
    pub fn new(settings: &TransportSettings) -> Result<Self, CrawlError> {
        let connect_timeout = settings
            .timeout
            .min(Duration::from_secs(CONNECT_TIMEOUT_SECS));

        let mut builder = Client::builder()
            .redirect(Policy::none())
            .cookie_store(true)
            .gzip(true)
            .timeout(settings.timeout)
            .connect_timeout(connect_timeout);

        if let Some(proxy) = settings.proxy.as_deref() {
            builder = builder.proxy(Proxy::all(proxy).map_err(CrawlError::client_build)?);
        }

        Ok(Self {
            client: builder.build().map_err(CrawlError::client_build)?,
            user_agent: settings.user_agent.clone(),
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest<'_>) -> Result<RawResponse, CrawlError> {
        let user_agent = self.user_agent.pick();
        trace!(method = %request.method, url = %request.url, user_agent = %user_agent, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, HTML_ACCEPT);
        if let Some(referer) = request.referer {
            builder = builder.header(REFERER, referer.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|error| CrawlError::transport(request.url.as_str(), error))?;

        let status = response.status().as_u16();
        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let location = header(LOCATION);
        let content_type = header(CONTENT_TYPE);

        let body = if *request.method == Method::HEAD {
            String::new()
        } else {
            response
                .text()
                .await
                .map_err(|error| CrawlError::transport(request.url.as_str(), error))?
        };

        Ok(RawResponse {
            status,
            location,
            content_type,
            body,
        })
    }
}
