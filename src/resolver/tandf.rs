//! Taylor & Francis Online strategy.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

use super::utils::{open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const HOST: &str = "www.tandfonline.com";
const HOSTS: &[&str] = &[HOST];
const MAX_DEPTH: usize = 1;

/// Taylor & Francis keeps supplementary files on a separate `/doi/suppl/`
/// page, visited before the DOI landing page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TandfonlineStrategy;

#[async_trait]
impl Strategy for TandfonlineStrategy {
    fn key(&self) -> &'static str {
        "tandfonline"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "tandfonline", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).without_origin_host();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html("a[title='Download all'][href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_full_text(link);
                }
            });
            session.on_html("li.pdf-tab", |_, scope| {
                let link = format!(
                    "https://{HOST}/doi/pdf/{}?needAccess=true",
                    scope.options().doi
                );
                scope.push_full_text(link);
            });
        }
        if options.supplementary {
            for pattern in ["a.show-pdf[href]", "#supplementaryPanel a"] {
                session.on_html(pattern, |el, scope| {
                    if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                        scope.push_supplementary(link);
                    }
                });
            }
            let suppl = format!("https://{HOST}/doi/suppl/{}", options.doi);
            visit_or_log(&mut session, &suppl).await;
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

    const DOI: &str = "10.1080/22221751.2020.1729069";
    const LANDING: &str = "https://www.tandfonline.com/doi/full/10.1080/22221751.2020.1729069";
    const SUPPL: &str = "https://www.tandfonline.com/doi/suppl/10.1080/22221751.2020.1729069";

    fn web() -> ReplayWeb {
        ReplayWeb::new()
            .with_redirect(&format!("https://doi.org/{DOI}"), LANDING)
            .with_page(
                LANDING,
                r#"<ul class="tab-nav"><li class="pdf-tab"><a href="/doi/pdf/x">PDF</a></li></ul>
                <a class="show-pdf" href="/doi/suppl/10.1080/22221751.2020.1729069/suppl_file/temi_a_1729069_sm1.pdf">SM</a>"#,
            )
            .with_page(
                SUPPL,
                r#"<div id="supplementaryPanel">
                  <a href="/doi/suppl/10.1080/22221751.2020.1729069/suppl_file/temi_a_1729069_sm2.docx">Table S1</a>
                  <a>anchor without href</a>
                </div>
                <a title="Download all" href="/action/downloadSupplement?doi=10.1080%2F22221751.2020.1729069">Download all</a>"#,
            )
    }

    #[tokio::test]
    async fn test_suppl_page_is_visited_before_landing() {
        let web = web();
        let options = ResolutionOptions::new(DOI).with_supplementary(true);
        let harvest = TandfonlineStrategy
            .resolve(&options, &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec![
                "https://www.tandfonline.com/action/downloadSupplement?doi=10.1080%2F22221751.2020.1729069",
                "https://www.tandfonline.com/doi/suppl/10.1080/22221751.2020.1729069/suppl_file/temi_a_1729069_sm2.docx",
                "https://www.tandfonline.com/doi/pdf/10.1080/22221751.2020.1729069?needAccess=true",
                "https://www.tandfonline.com/doi/suppl/10.1080/22221751.2020.1729069/suppl_file/temi_a_1729069_sm1.pdf",
            ]
        );
        assert_eq!(web.fetched_urls()[0], SUPPL);
    }

    #[tokio::test]
    async fn test_full_text_only_skips_suppl_page() {
        let web = web();
        let harvest = TandfonlineStrategy
            .resolve(&ResolutionOptions::new(DOI), &replay_toolkit(&web))
            .await
            .unwrap();
        assert_eq!(
            harvest.into_urls(),
            vec!["https://www.tandfonline.com/doi/pdf/10.1080/22221751.2020.1729069?needAccess=true"]
        );
        assert!(!web.fetched_urls().iter().any(|url| url == SUPPL));
    }
}
