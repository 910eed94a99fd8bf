//! AAAS strategy for the Science family of journals.

use async_trait::async_trait;
use url::Url;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

use super::utils::{CITATION_PDF_SELECTOR, open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &[
    "advances.sciencemag.org",
    "immunology.sciencemag.org",
    "robotics.sciencemag.org",
    "stke.sciencemag.org",
    "stm.sciencemag.org",
    "secure.jbs.elsevierhealth.com",
    "id.elsevier.com",
    "science.sciencemag.org",
    "www.sciencemag.org",
];
const MAX_DEPTH: usize = 2;

/// Science articles list supplementary files on a "figures & data" tab
/// derived from the citation PDF URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScienceStrategy;

#[async_trait]
impl Strategy for ScienceStrategy {
    fn key(&self) -> &'static str {
        "science"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "science", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).with_referer();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html("div.panels-ajax-tab-wrap-jnl_sci_tab_pdf a[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_full_text(link);
                }
            });
        }

        // The supplementary rule exists only once a citation PDF was seen.
        session.on_html(CITATION_PDF_SELECTOR, |el, scope| {
            let Some(citation) = el.attr("content").and_then(|content| Url::parse(content).ok())
            else {
                return;
            };
            let link = format!(
                "{}://{}{}",
                citation.scheme(),
                citation.host_str().unwrap_or_default(),
                citation.path()
            );

            if scope.options().full_text {
                scope.push_full_text(link.clone());
            }
            if scope.options().supplementary {
                scope.on_html("a.rewritten[href]", move |el, scope| {
                    if let Some(target) = el.attr("href").and_then(|href| citation.join(href).ok()) {
                        scope.push_supplementary(format!(
                            "{}://{}{}",
                            citation.scheme(),
                            citation.host_str().unwrap_or_default(),
                            target.path()
                        ));
                    }
                });
                scope.visit(format!("{}/tab-figures-data", link.replacen(".full.pdf", "", 1)));
            }
        });

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}
