//! IEEE Xplore strategy for `/document/<arnumber>` landing pages.
//!
//! Xplore serves the PDF inside an iframe on `/stamp/stamp.jsp`. The first
//! response of the crawl is the document page, whose last path segment is the
//! article number used to build the stamp URL.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};
use crate::link::last_path_segment;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &["ieeexplore.ieee.org"];
const MAX_DEPTH: usize = 2;
const STAMP_PATH: &str = "/stamp/stamp.jsp?arnumber=";

/// Specialized strategy for IEEE Xplore documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct IeeeStrategy;

#[async_trait]
impl Strategy for IeeeStrategy {
    fn key(&self) -> &'static str {
        "ieee"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "ieee", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).without_origin_host();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html("a.download_menu_anchor[href]", |el, scope| {
                let Some(href) = el.attr("href").filter(|href| href.contains(".zip")) else {
                    return;
                };
                if let Some(link) = scope.normalize(href) {
                    scope.push_full_text(link);
                }
            });

            let stamped = AtomicBool::new(false);
            session.on_response(move |page, scope| {
                if stamped.swap(true, Ordering::Relaxed) {
                    return;
                }
                let Some(arnumber) = last_path_segment(&page.url) else {
                    return;
                };
                let Some(stamp) = scope.normalize(&format!("{STAMP_PATH}{arnumber}")) else {
                    return;
                };
                scope.on_html("iframe[src]", |el, scope| {
                    if let Some(link) = el.attr("src").and_then(|src| scope.normalize(src)) {
                        scope.push_full_text(link);
                    }
                });
                scope.visit(stamp);
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crawl::ReplayWeb;
    use crate::resolver::utils::replay_toolkit;

    const DOI: &str = "10.1109/TPAMI.2019.2913372";
    const LANDING: &str = "https://ieeexplore.ieee.org/document/8700223/";
    const STAMP: &str = "https://ieeexplore.ieee.org/stamp/stamp.jsp?arnumber=8700223";

    fn web() -> ReplayWeb {
        ReplayWeb::new()
            .with_redirect(&format!("https://doi.org/{DOI}"), LANDING)
            .with_page(LANDING, "<title>IEEE Xplore</title>")
            .with_page(
                STAMP,
                r#"<iframe src="https://ieeexplore.ieee.org/stampPDF/getPDF.jsp?tp=&arnumber=8700223&ref="></iframe>"#,
            )
    }

    #[tokio::test]
    async fn test_stamp_page_iframe_is_full_text() {
        let web = web();
        let harvest = IeeeStrategy
            .resolve(&ResolutionOptions::new(DOI), &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec!["https://ieeexplore.ieee.org/stampPDF/getPDF.jsp?tp=&arnumber=8700223&ref="]
        );
        assert_eq!(
            web.fetched_urls(),
            vec![format!("https://doi.org/{DOI}"), LANDING.to_string(), STAMP.to_string()]
        );
    }

    #[tokio::test]
    async fn test_supplementary_only_skips_stamp_page() {
        let web = web();
        let options = ResolutionOptions::new(DOI)
            .with_full_text(false)
            .with_supplementary(true);
        let harvest = IeeeStrategy
            .resolve(&options, &replay_toolkit(&web))
            .await
            .unwrap();
        assert!(harvest.is_empty());
        assert_eq!(web.fetched_urls().len(), 2);
    }
}
