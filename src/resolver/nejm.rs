//! New England Journal of Medicine strategy.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};
use crate::link::with_host;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOST: &str = "www.nejm.org";
const HOSTS: &[&str] = &[HOST];
const MAX_DEPTH: usize = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct NejmStrategy;

#[async_trait]
impl Strategy for NejmStrategy {
    fn key(&self) -> &'static str {
        "nejm"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "nejm", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html("a[data-tooltip='Download PDF'][href]", |el, scope| {
                if let Some(href) = el.attr("href") {
                    scope.push_full_text(with_host(HOST, href));
                }
            });
        }
        if options.supplementary {
            session.on_html("a[data-interactiontype=multimedia_download][href]", |el, scope| {
                if let Some(href) = el.attr("href").filter(|href| href.contains("doi/suppl")) {
                    scope.push_supplementary(with_host(HOST, href));
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}
