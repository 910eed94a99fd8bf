//! Deterministic in-memory transport.
//!
//! [`ReplayWeb`] answers requests from a fixed table of canned responses and
//! records every request it receives. It implements both [`Connector`] and
//! [`Transport`], so a whole strategy can run offline against captured pages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use super::transport::{Connector, OutboundRequest, RawResponse, Transport, TransportSettings};
use super::CrawlError;

#[derive(Debug, Clone)]
enum Route {
    Respond(RawResponse),
    Fail(String),
}

/// A request observed by a [`ReplayWeb`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Requested URL.
    pub url: String,
    /// `Referer` sent with the request.
    pub referer: Option<String>,
}

/// Canned-response web used in place of the network.
///
/// Unknown URLs answer `404`. Clones share the request log.
#[derive(Debug, Clone, Default)]
pub struct ReplayWeb {
    routes: HashMap<String, Route>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ReplayWeb {
    /// Creates an empty replay web.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` with status 200 at `url`.
    #[must_use]
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.with_response(url, RawResponse::html(html))
    }

    /// Answers `url` with a 302 to `location`.
    #[must_use]
    pub fn with_redirect(self, url: &str, location: impl Into<String>) -> Self {
        self.with_response(url, RawResponse::redirect(location))
    }

    /// Answers `url` with an empty response carrying `status`.
    #[must_use]
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(url, RawResponse::status(status))
    }

    /// Answers `url` with `response`.
    #[must_use]
    pub fn with_response(mut self, url: &str, response: RawResponse) -> Self {
        self.routes.insert(route_key(url), Route::Respond(response));
        self
    }

    /// Makes requests to `url` fail at the transport level.
    #[must_use]
    pub fn with_failure(mut self, url: &str, reason: impl Into<String>) -> Self {
        self.routes.insert(route_key(url), Route::Fail(reason.into()));
        self
    }

    /// All requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// URLs requested with `GET`, in order.
    #[must_use]
    pub fn fetched_urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == Method::GET)
            .map(|request| request.url)
            .collect()
    }

    fn record(&self, request: &OutboundRequest<'_>) {
        if let Ok(mut log) = self.log.lock() {
            log.push(RecordedRequest {
                method: request.method.clone(),
                url: request.url.to_string(),
                referer: request.referer.map(ToString::to_string),
            });
        }
    }
}

fn route_key(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |parsed| parsed.to_string())
}

#[async_trait]
impl Transport for ReplayWeb {
    async fn send(&self, request: OutboundRequest<'_>) -> Result<RawResponse, CrawlError> {
        self.record(&request);
        match self.routes.get(request.url.as_str()) {
            Some(Route::Respond(response)) => {
                let mut response = response.clone();
                if *request.method == Method::HEAD {
                    response.body.clear();
                }
                Ok(response)
            }
            Some(Route::Fail(reason)) => Err(CrawlError::transport(request.url.as_str(), reason)),
            None => Ok(RawResponse::status(404)),
        }
    }
}

impl Connector for ReplayWeb {
    fn connect(&self, _settings: &TransportSettings) -> Result<Arc<dyn Transport>, CrawlError> {
        Ok(Arc::new(self.clone()))
    }
}
