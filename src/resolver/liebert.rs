//! Mary Ann Liebert strategy.

use async_trait::async_trait;
use url::Url;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};
use crate::link::normalize_link;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOST: &str = "www.liebertpub.com";
const HOSTS: &[&str] = &[HOST];
const MAX_DEPTH: usize = 2;

/// Liebert serves the PDF at a path templated from the DOI, so only the
/// supplementary links require crawling the article page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiebertPubStrategy;

#[async_trait]
impl Strategy for LiebertPubStrategy {
    fn key(&self) -> &'static str {
        "liebertpub"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "liebertpub", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).without_origin_host();
        let mut session = open_publisher_session(toolkit, options, config)?;
        let entry = format!("https://{HOST}/doi/{}", options.doi);

        if options.full_text {
            let base = match &options.origin_url {
                Some(origin) => origin.clone(),
                None => Url::parse(&entry).map_err(|error| CrawlError::invalid_url(&entry, error))?,
            };
            if let Some(pdf) = normalize_link(&format!("/doi/pdfplus/{}", options.doi), &base) {
                session.harvest_mut().push_full_text(pdf);
            }
        }
        if options.supplementary {
            session.on_html("a.ext-link[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_supplementary(link);
                }
            });
        }

        visit_or_log(&mut session, &entry).await;
        Ok(session.into_harvest())
    }
}
