//! Blood (American Society of Hematology) strategy.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

use super::utils::{CITATION_PDF_SELECTOR, open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &["signin.hematology.org", "www.bloodjournal.org"];
const MAX_DEPTH: usize = 2;

/// Blood rejects rotating browser agents, so this session identifies itself
/// with the fixed project agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct BloodJournalStrategy;

#[async_trait]
impl Strategy for BloodJournalStrategy {
    fn key(&self) -> &'static str {
        "bloodjournal"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "bloodjournal", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).with_fixed_user_agent();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html(CITATION_PDF_SELECTOR, |el, scope| {
                if let Some(link) = el.attr("content").and_then(|content| scope.normalize(content)) {
                    scope.push_full_text(link);
                }
            });
        }
        if options.supplementary {
            session.on_html("a[data-panel-name=jnl_bloodjournal_tab_data][href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.visit(link);
                }
            });
            session.on_html("a.rewritten[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_supplementary(link);
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}
