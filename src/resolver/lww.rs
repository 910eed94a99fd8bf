//! Wolters Kluwer (LWW) journals strategy.
//!
//! LWW articles are addressed by DOI directly on `journals.lww.com`. The
//! supplementary links point at a `links.lww.com` shortener, so each one is
//! resolved with `HEAD` and the final URL is reported instead.

use async_trait::async_trait;

use crate::crawl::{ArtifactKind, CrawlError, CrawlToolkit, Harvest};

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &["journals.lww.com", "links.lww.com", "download.lww.com"];
const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct LwwStrategy;

#[async_trait]
impl Strategy for LwwStrategy {
    fn key(&self) -> &'static str {
        "lww"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "lww", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).without_origin_host();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html(
                "div.ejp-article-wrapper #js-ejp-article-tools[data-pdf-url]",
                |el, scope| {
                    if let Some(link) = el.attr("data-pdf-url").and_then(|url| scope.normalize(url)) {
                        scope.push_full_text(link);
                    }
                },
            );
        }
        if options.supplementary {
            session.on_html("#ej-article-sam-container a[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.resolve_head(ArtifactKind::Supplementary, link);
                }
            });
        }

        let entry = format!("https://journals.lww.com/{}", options.doi);
        visit_or_log(&mut session, &entry).await;
        Ok(session.into_harvest())
    }
}
