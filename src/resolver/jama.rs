//! JAMA Network strategy.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};
use crate::link::with_host;

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOST: &str = "jamanetwork.com";
const HOSTS: &[&str] = &[HOST];
const MAX_DEPTH: usize = 1;

/// JAMA exposes the PDF path in a data attribute of the toolbar button.
#[derive(Debug, Clone, Copy, Default)]
pub struct JamaStrategy;

#[async_trait]
impl Strategy for JamaStrategy {
    fn key(&self) -> &'static str {
        "jama"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "jama", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html("#contents-tab a.toolbar-pdf[data-article-url]", |el, scope| {
                if let Some(path) = el.attr("data-article-url") {
                    scope.push_full_text(with_host(HOST, path));
                }
            });
        }
        if options.supplementary {
            session.on_html(".supplement a.supplement-download[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_supplementary(link);
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crawl::ReplayWeb;
    use crate::resolver::utils::replay_toolkit;

    const DOI: &str = "10.1001/jama.2020.1585";
    const LANDING: &str = "https://jamanetwork.com/journals/jama/fullarticle/2761044";

    fn web() -> ReplayWeb {
        ReplayWeb::new()
            .with_redirect(&format!("https://doi.org/{DOI}"), LANDING)
            .with_page(
                LANDING,
                r#"<div id="contents-tab">
                  <a class="toolbar-pdf" data-article-url="/journals/jama/articlepdf/2761044/jama_wang_2020_oi_200019.pdf">PDF</a>
                </div>
                <div class="supplement">
                  <a class="supplement-download" href="https://cdn.jamanetwork.com/ama/content_public/journal/jama/supplement.pdf">Supplement</a>
                </div>
                <a class="toolbar-pdf" data-article-url="/outside/contents-tab.pdf">stray</a>"#,
            )
    }

    #[tokio::test]
    async fn test_toolbar_pdf_is_prefixed() {
        let web = web();
        let harvest = JamaStrategy
            .resolve(&ResolutionOptions::new(DOI), &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec!["https://jamanetwork.com/journals/jama/articlepdf/2761044/jama_wang_2020_oi_200019.pdf"]
        );
    }

    #[tokio::test]
    async fn test_supplement_only() {
        let web = web();
        let options = ResolutionOptions::new(DOI)
            .with_full_text(false)
            .with_supplementary(true);
        let harvest = JamaStrategy
            .resolve(&options, &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec!["https://cdn.jamanetwork.com/ama/content_public/journal/jama/supplement.pdf"]
        );
    }

    #[tokio::test]
    async fn test_relative_supplement_link_is_absolute() {
        let web = ReplayWeb::new()
            .with_redirect(&format!("https://doi.org/{DOI}"), LANDING)
            .with_page(
                LANDING,
                r#"<div class="supplement"><a class="supplement-download" href="/data/Journals/JAMA/supp1.pdf">eTable</a></div>"#,
            );
        let options = ResolutionOptions::new(DOI)
            .with_full_text(false)
            .with_supplementary(true);
        let harvest = JamaStrategy
            .resolve(&options, &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec!["https://jamanetwork.com/data/Journals/JAMA/supp1.pdf"]
        );
    }
}
