//! Cell Press / Elsevier strategy.
//!
//! DOIs resolve through `linkinghub.elsevier.com`, which bounces to the
//! journal skin through a hidden `#redirectURL` input or a meta refresh.
//! Several skins expose the PDF under different anchors, so the first
//! candidate wins. Supplementary listings are built client-side and come
//! from the headless renderer.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::crawl::{CrawlError, CrawlToolkit, Harvest};

use super::utils::{
    CITATION_PDF_SELECTOR, meta_refresh_target, open_publisher_session, publisher_config,
    visit_or_log,
};
use super::{ResolutionOptions, Strategy};

const HOSTS: &[&str] = &[
    "www.cell.com",
    "cell.com",
    "linkinghub.elsevier.com",
    "secure.jbs.elsevierhealth.com",
    "id.elsevier.com",
    "www.cancercell.org",
    "www.sciencedirect.com",
    "pdf.sciencedirectassets.com",
    "www.thelancet.com",
    "www.gastrojournal.org",
    "www.clinicalkey.com",
];
const MAX_DEPTH: usize = 3;
const LINKINGHUB_BASE: &str = "https://linkinghub.elsevier.com";
const SCIENCEDIRECT_BASE: &str = "https://www.sciencedirect.com";

/// Anchors that carry the PDF on the different article-tools skins.
const NORMALIZED_PDF_ANCHORS: &[&str] = &[
    "a.article-tools__item__displayStandardPdf[href]",
    "a.article-tools__item__displayExtendedPdf[href]",
    ".article-tools__pdf a[href]",
];

/// Strategy for Cell Press, The Lancet and other Elsevier-hosted journals.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellStrategy;

#[async_trait]
impl Strategy for CellStrategy {
    fn key(&self) -> &'static str {
        "cell"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "cell", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH).with_referer();
        let mut session = open_publisher_session(toolkit, options, config)?;

        if options.full_text {
            session.on_html(CITATION_PDF_SELECTOR, |el, scope| {
                if let Some(link) = el.attr("content").and_then(|content| scope.normalize(content)) {
                    scope.push_full_text(link);
                }
            });
            session.on_html("a.pdfLink[href]", |el, scope| {
                if let Some(link) = el
                    .attr("href")
                    .filter(|href| *href != "#")
                    .and_then(|href| scope.normalize(href))
                {
                    scope.claim_full_text(link);
                }
            });
            for pattern in NORMALIZED_PDF_ANCHORS {
                session.on_html(pattern, |el, scope| {
                    if let Some(link) = el
                        .attr("href")
                        .filter(|href| *href != "#")
                        .and_then(|href| scope.normalize(href))
                    {
                        scope.claim_full_text(link);
                    }
                });
            }
            session.on_html("div.PdfDownloadButton a[href]", |el, scope| {
                if let Some(href) = el.attr("href").filter(|href| *href != "#") {
                    scope.claim_full_text(format!("{SCIENCEDIRECT_BASE}{href}"));
                }
            });
        }

        session.on_html("#redirectURL", |el, scope| {
            let Some(value) = el.attr("value") else {
                return;
            };
            match decode_redirect_value(value) {
                Some(target) => scope.visit(target),
                None => debug!(value, "Undecodable redirectURL; skipping"),
            }
        });
        session.on_html(r#"meta[http-equiv="refresh" i]"#, |el, scope| {
            let Some(target) = el.attr("content").and_then(meta_refresh_target) else {
                return;
            };
            if target.starts_with("http://") || target.starts_with("https://") {
                scope.visit(target);
            } else {
                scope.visit(format!("{LINKINGHUB_BASE}{target}"));
            }
        });

        let doi_url = options.doi_url();
        visit_or_log(&mut session, &doi_url).await;

        if options.supplementary {
            match toolkit
                .renderer()
                .supplementary_urls(&doi_url, options.timeout, options.proxy.as_deref())
                .await
            {
                Ok(urls) => {
                    for url in urls {
                        session.harvest_mut().push_supplementary(url);
                    }
                }
                Err(error) => warn!(error = %error, "Rendered supplementary lookup failed"),
            }
        }

        Ok(session.into_harvest())
    }
}

/// Decodes the hidden `#redirectURL` value.
///
/// Linkinghub escapes the target once for the attribute and may escape it
/// again as a query value, so the value is unescaped twice. Unescaping an
/// already plain URL leaves it unchanged.
fn decode_redirect_value(value: &str) -> Option<String> {
    let once = urlencoding::decode(value.trim()).ok()?;
    let twice = urlencoding::decode(&once).ok()?;
    Some(twice.into_owned()).filter(|target| !target.is_empty())
}
