//! Nature Portfolio strategy for `www.nature.com` articles.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest, Scope};
use crate::link::{has_article_identifier_segment, reencode_article_segment};

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &["www.nature.com", "idp.nature.com"];
const MAX_DEPTH: usize = 1;

/// Nature landing pages carry both the PDF button and the ESM attachment list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NatureStrategy;

#[async_trait]
impl Strategy for NatureStrategy {
    fn key(&self) -> &'static str {
        "nature"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "nature", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html("a.c-pdf-download__link[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_full_text(link);
                }
            });
        }
        if options.supplementary {
            session.on_html("a.print-link[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| attachment_link(href, scope)) {
                    scope.push_supplementary(link);
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}

/// Figure pages are skipped. Attachment hosts need the `art:` identifier
/// folded into one escaped segment.
fn attachment_link(href: &str, scope: &Scope<'_>) -> Option<String> {
    if href.contains("/figures/") {
        return None;
    }
    if href.starts_with("http") {
        return reencode_article_segment(href);
    }
    let link = scope.normalize(href)?;
    if has_article_identifier_segment(&link) {
        reencode_article_segment(&link)
    } else {
        Some(link)
    }
}
