//! American Thoracic Society journals strategy.
//!
//! ATS article URLs are predictable from the DOI, so the full text is
//! templated without a request and the DOI resolver is never contacted.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};
use crate::link::with_host;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOST: &str = "www.atsjournals.org";
const HOSTS: &[&str] = &[HOST];
const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct AtsJournalsStrategy;

#[async_trait]
impl Strategy for AtsJournalsStrategy {
    fn key(&self) -> &'static str {
        "atsjournals"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "atsjournals", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            let pdf = format!("https://{HOST}/doi/pdf/{}", options.doi);
            session.harvest_mut().push_full_text(pdf);
        }
        if options.supplementary {
            session.on_html(".suppl_list a[href]", |el, scope| {
                if let Some(href) = el.attr("href") {
                    let link = with_host(scope.origin_or_page_host(), href);
                    scope.push_supplementary(link);
                }
            });
            let suppl = format!("https://{HOST}/doi/suppl/{}", options.doi);
            visit_or_log(&mut session, &suppl).await;
        }

        Ok(session.into_harvest())
    }
}
