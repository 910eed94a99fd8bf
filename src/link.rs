//! Link normalization for hrefs scraped from publisher pages.
//!
//! Publisher pages mix absolute, protocol-relative, host-relative and
//! path-relative links. Everything a strategy emits goes through
//! [`normalize_link`] so callers always receive absolute URLs.

use url::{Position, Url};
use urlencoding::{decode, encode};

/// Resolves a possibly relative href against `base`.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base`, which also
/// percent-encodes characters the href carried raw.
///
/// Returns `None` for empty hrefs, bare fragments and non-navigable schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`).
#[must_use]
pub fn normalize_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }
    if href.starts_with("//") {
        return Some(format!("https:{href}"));
    }
    base.join(href).ok().map(|url| url.to_string())
}

/// Prefixes a host-relative path with `https://<host>`.
#[must_use]
pub fn with_host(host: &str, path: &str) -> String {
    format!("https://{host}{path}")
}

/// Rewrites an attachment URL whose third path segment carries a colon-bearing
/// article identifier (`/esm/art:10.1038/s41586-.../file.pdf`).
///
/// The path is split after percent-decoding, so links served already escaped
/// (`/esm/art%3A10.1038%2Fs41586-.../file.pdf`) come out unchanged. The
/// identifier and the following segment are joined with `%2F` into the single
/// escaped segment the attachment host expects, and every segment is escaped
/// again (`art:` becomes `art%3A`). Query and fragment are dropped. Returns
/// `None` when the decoded path has fewer than four segments (counting the
/// empty leading one) or the URL cannot be parsed.
#[must_use]
pub fn reencode_article_segment(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let path = decoded_path(&url);
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 4 {
        return None;
    }

    let mut rebuilt: Vec<String> = segments[..2].iter().map(|s| encode(s).into_owned()).collect();
    rebuilt.push(format!("{}%2F{}", encode(segments[2]), encode(segments[3])));
    rebuilt.extend(segments[4..].iter().map(|s| encode(s).into_owned()));

    Some(format!("{}{}", &url[..Position::BeforePath], rebuilt.join("/")))
}

/// Returns true if the third path segment of `link` carries an `art:`
/// identifier, escaped or not.
#[must_use]
pub fn has_article_identifier_segment(link: &str) -> bool {
    Url::parse(link).ok().is_some_and(|url| {
        decoded_path(&url)
            .split('/')
            .nth(2)
            .is_some_and(|segment| segment.starts_with("art:"))
    })
}

/// The URL path with percent-escapes resolved; the raw path if the escapes
/// are not UTF-8.
fn decoded_path(url: &Url) -> String {
    decode(url.path()).map_or_else(|_| url.path().to_string(), std::borrow::Cow::into_owned)
}

/// Returns the last non-empty path segment of `url` (`/document/8600701/` → `8600701`).
#[must_use]
pub fn last_path_segment(url: &Url) -> Option<&str> {
    url.path().split('/').rev().find(|segment| !segment.is_empty())
}
