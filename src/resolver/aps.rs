//! American Physical Society journals strategy.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &["journals.aps.org", "link.aps.org"];
const MAX_DEPTH: usize = 1;

/// APS lists the PDF among the article navigation actions. There is no
/// supplementary rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApsStrategy;

#[async_trait]
impl Strategy for ApsStrategy {
    fn key(&self) -> &'static str {
        "aps"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "aps", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).without_origin_host();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html(".article-nav-actions a[href]", |el, scope| {
                let Some(href) = el.attr("href").filter(|href| href.contains("/pdf/")) else {
                    return;
                };
                if let Some(link) = scope.normalize(href) {
                    scope.push_full_text(link);
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}
