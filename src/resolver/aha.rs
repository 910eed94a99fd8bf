//! American Heart Association journals strategy.
//!
//! Supplementary material sits on the article's `/doi/suppl/` page, which is
//! only reached by rewriting the PDF link the full-text rule finds. Asking
//! for supplementary files alone therefore only sees what the landing page
//! itself lists.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};
use crate::link::with_host;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOST: &str = "www.ahajournals.org";
const HOSTS: &[&str] = &[HOST];
const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct AhaJournalsStrategy;

#[async_trait]
impl Strategy for AhaJournalsStrategy {
    fn key(&self) -> &'static str {
        "ahajournals"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "ahajournals", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html(".citation__access__actions a[href]", |el, scope| {
                let Some(href) = el.attr("href") else {
                    return;
                };
                let link = with_host(HOST, href);
                let suppl = link.replace("/doi/pdf/", "/doi/suppl/");
                scope.push_full_text(link);
                scope.visit(suppl);
            });
        }
        if options.supplementary {
            session.on_html(
                ".supplemental-material__item a.green-text-color[href]",
                |el, scope| {
                    if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                        scope.push_supplementary(link);
                    }
                },
            );
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}
