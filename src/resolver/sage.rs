//! SAGE Journals strategy.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &["journals.sagepub.com"];
const MAX_DEPTH: usize = 2;
const MIRROR_BASE: &str = "http://sage.cnpereading.com/paragraph/download";

/// SAGE links the PDF from its access box. When the landing page yields
/// nothing the strategy falls back to the CNPeReading mirror, which serves
/// many SAGE articles by DOI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SagePubStrategy;

#[async_trait]
impl Strategy for SagePubStrategy {
    fn key(&self) -> &'static str {
        "sagepub"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "sagepub", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).without_origin_host();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html(".pdf-access a[href]", |el, scope| {
                let Some(href) = el.attr("href").filter(|href| href.contains("/pdf/")) else {
                    return;
                };
                if let Some(link) = scope.normalize(href) {
                    scope.push_full_text(link);
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;

        if options.full_text && !session.harvest().has_full_text() {
            let mirror = format!("{MIRROR_BASE}/{}", options.doi);
            tracing::debug!(url = %mirror, "No PDF link on landing page; using mirror");
            session.harvest_mut().push_full_text(mirror);
        }
        Ok(session.into_harvest())
    }
}
