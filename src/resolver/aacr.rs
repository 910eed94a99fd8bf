//! American Association for Cancer Research journals strategy.
//!
//! AACR article URLs accept `.full-text.pdf` and `.figures-only` suffixes, so
//! the strategy derives both from the resolved landing page instead of
//! scraping for them. Pages that already carry a suffix are left alone, which
//! keeps the figures page from spawning another figures page.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest, PageResponse};
use crate::link::with_host;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &[
    "aacrjournals.org",
    "cancerdiscovery.aacrjournals.org",
    "clincancerres.aacrjournals.org",
    "cancerimmunolres.aacrjournals.org",
];
const MAX_DEPTH: usize = 2;
const FIGURES_SUFFIX: &str = ".figures-only";
const PDF_SUFFIX: &str = ".full-text.pdf";

#[derive(Debug, Clone, Copy, Default)]
pub struct AacrStrategy;

#[async_trait]
impl Strategy for AacrStrategy {
    fn key(&self) -> &'static str {
        "aacr"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "aacr", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.supplementary {
            session.on_html("a.rewritten[href]", |el, scope| {
                if let Some(href) = el.attr("href") {
                    let link = with_host(scope.page_host(), href);
                    scope.push_supplementary(link);
                }
            });
        }
        session.on_response(|page, scope| {
            if !is_article_page(page) {
                return;
            }
            let url = page.url.as_str();
            if scope.options().supplementary {
                scope.visit(format!("{url}{FIGURES_SUFFIX}"));
            }
            if scope.options().full_text {
                scope.push_full_text(format!("{url}{PDF_SUFFIX}"));
            }
        });

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}

fn is_article_page(page: &PageResponse) -> bool {
    let url = page.url.as_str();
    url.contains("aacrjournals.org") && !url.ends_with(FIGURES_SUFFIX) && !url.ends_with(PDF_SUFFIX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crawl::ReplayWeb;
    use crate::resolver::utils::replay_toolkit;

    const DOI: &str = "10.1158/2159-8290.CD-20-0422";
    const ENTRY: &str = "https://doi.org/10.1158/2159-8290.CD-20-0422";
    const LANDING: &str = "https://cancerdiscovery.aacrjournals.org/content/10/6/783";
    const FIGURES: &str = "https://cancerdiscovery.aacrjournals.org/content/10/6/783.figures-only";

    fn web() -> ReplayWeb {
        ReplayWeb::new()
            .with_redirect(ENTRY, LANDING)
            .with_page(LANDING, "<p>abstract</p>")
            .with_page(
                FIGURES,
                r#"<a class="rewritten" href="/content/suppl/2020/04/30/2159-8290.CD-20-0422.DC1/supp.pdf">Supplementary</a>"#,
            )
    }

    #[tokio::test]
    async fn test_suffixes_derived_from_final_url() {
        let web = web();
        let options = ResolutionOptions::new(DOI).with_supplementary(true);
        let harvest = AacrStrategy
            .resolve(&options, &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec![
                "https://cancerdiscovery.aacrjournals.org/content/suppl/2020/04/30/2159-8290.CD-20-0422.DC1/supp.pdf",
                "https://cancerdiscovery.aacrjournals.org/content/10/6/783.full-text.pdf",
            ]
        );
        assert_eq!(
            web.fetched_urls(),
            vec![ENTRY, LANDING, FIGURES]
        );
    }

    #[tokio::test]
    async fn test_full_text_only_does_not_visit_figures() {
        let web = web();
        let harvest = AacrStrategy
            .resolve(&ResolutionOptions::new(DOI), &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec!["https://cancerdiscovery.aacrjournals.org/content/10/6/783.full-text.pdf"]
        );
        assert_eq!(web.fetched_urls().len(), 2);
    }
}
