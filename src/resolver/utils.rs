//! Shared utilities for strategy modules: session setup, host normalization and common patterns.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::crawl::{CrawlError, CrawlSession, CrawlToolkit, SessionConfig};

use super::ResolutionOptions;

/// Host every DOI entry visit goes through.
pub const DOI_HOST: &str = "doi.org";

/// Selector for the Highwire `citation_pdf_url` meta tag most publishers emit.
pub const CITATION_PDF_SELECTOR: &str = "meta[name=citation_pdf_url]";

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Target of a `<meta http-equiv="refresh" content="0;url='...'">` tag.
pub static META_REFRESH_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?i)url\s*=\s*['"]?([^'"\s]+)"#));

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercases.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

/// Returns true if the two host strings refer to the same host after normalization.
#[must_use]
pub fn hosts_match(lhs: &str, rhs: &str) -> bool {
    canonical_host(lhs) == canonical_host(rhs)
}

/// Extracts the refresh target from a meta-refresh `content` value.
#[must_use]
pub fn meta_refresh_target(content: &str) -> Option<&str> {
    META_REFRESH_URL_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|target| !target.is_empty())
}

/// Session shape shared by publisher strategies: the strategy's hosts plus
/// the DOI resolver, labelled with the strategy key.
#[must_use]
pub fn publisher_config(key: &'static str, hosts: &[&str], max_depth: usize) -> SessionConfig {
    SessionConfig::new(
        hosts.iter().copied().chain(std::iter::once(DOI_HOST)),
        max_depth,
    )
    .with_label(key)
}

/// Opens a session and installs the request log observer every strategy uses.
///
/// # Errors
///
/// Returns [`CrawlError::ClientBuild`] if the transport cannot be built.
pub fn open_publisher_session(
    toolkit: &CrawlToolkit,
    options: &ResolutionOptions,
    config: SessionConfig,
) -> Result<CrawlSession, CrawlError> {
    let mut session = CrawlSession::open(toolkit, options.clone(), config)?;
    session.on_request(|url| info!(url = %url, "Visiting"));
    Ok(session)
}

/// Visits `url` and logs an entry failure instead of propagating it; results
/// collected before the failure stay in the session.
pub async fn visit_or_log(session: &mut CrawlSession, url: &str) {
    if let Err(error) = session.visit(url).await {
        warn!(url = %url, error = %error, "Crawl ended early");
    }
}

/// Toolkit over a replayed web, for strategy tests.
#[cfg(test)]
pub(crate) fn replay_toolkit(web: &crate::crawl::ReplayWeb) -> CrawlToolkit {
    CrawlToolkit::new(std::sync::Arc::new(web.clone()))
}
