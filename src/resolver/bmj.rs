//! BMJ Publishing Group strategy.
//!
//! The flagship `www.bmj.com` site exposes a direct PDF link whose `/related`
//! sibling lists supplementary files. The specialty journals on
//! `<journal>.bmj.com` only advertise the PDF through `citation_pdf_url`.

use async_trait::async_trait;

use crate::crawl::{CrawlError, CrawlToolkit, Harvest, Scope};
use crate::link::with_host;

use super::utils::{CITATION_PDF_SELECTOR, open_publisher_session, publisher_config, visit_or_log};
use super::{ResolutionOptions, Strategy};

const FLAGSHIP_HOST: &str = "www.bmj.com";
const HOSTS: &[&str] = &[
    "ard.bmj.com",
    "adc.bmj.com",
    "casereports.bmj.com",
    "ebm.bmj.com",
    "gh.bmj.com",
    "informatics.bmj.com",
    "innovations.bmj.com",
    "bmjleader.bmj.com",
    "militaryhealth.bmj.com",
    "neurologyopen.bmj.com",
    "nutrition.bmj.com",
    "bmjopen.bmj.com",
    "drc.bmj.com",
    "bmjopengastro.bmj.com",
    "bmjophth.bmj.com",
    "qir.bmj.com",
    "bmjopenrespres.bmj.com",
    "openscience.bmj.com",
    "bmjopensem.bmj.com",
    "qualitysafety.bmj.com",
    "bmjpaedsopen.bmj.com",
    "srh.bmj.com",
    "stel.bmj.com",
    "spcare.bmj.com",
    "sit.bmj.com",
    "bjo.bmj.com",
    "bjsm.bmj.com",
    "considerations.bmj.com",
    "dtb.bmj.com",
    "ep.bmj.com",
    "emj.bmj.com",
    "esmoopen.bmj.com",
    "ejhp.bmj.com",
    "ebmh.bmj.com",
    "ebn.bmj.com",
    "fmch.bmj.com",
    "fn.bmj.com",
    "fg.bmj.com",
    "gpsych.bmj.com",
    "gut.bmj.com",
    "heart.bmj.com",
    "heartasia.bmj.com",
    "injuryprevention.bmj.com",
    "inpractice.bmj.com",
    "ihj.bmj.com",
    "ijgc.bmj.com",
    "jitc.bmj.com",
    "jcp.bmj.com",
    "jech.bmj.com",
    "jim.bmj.com",
    "jisakos.bmj.com",
    "jme.bmj.com",
    "jmg.bmj.com",
    "jnnp.bmj.com",
    "jnis.bmj.com",
    "lupus.bmj.com",
    "mh.bmj.com",
    "oem.bmj.com",
    "openheart.bmj.com",
    "pmj.bmj.com",
    "pn.bmj.com",
    "rapm.bmj.com",
    "rmdopen.bmj.com",
    "sti.bmj.com",
    "svn.bmj.com",
    FLAGSHIP_HOST,
    "thorax.bmj.com",
    "tobaccocontrol.bmj.com",
    "tsaco.bmj.com",
    "veterinaryrecord.bmj.com",
    "vetrecordcasereports.bmj.com",
    "vetrecordopen.bmj.com",
    "wjps.bmj.com",
];
const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct BmjStrategy;

#[async_trait]
impl Strategy for BmjStrategy {
    fn key(&self) -> &'static str {
        "bmj"
    }

    fn hosts(&self) -> &'static [&'static str] {
        HOSTS
    }

    #[tracing::instrument(skip(self, options, toolkit), fields(strategy = "bmj", doi = %options.doi))]
    async fn resolve(
        &self,
        options: &ResolutionOptions,
        toolkit: &CrawlToolkit,
    ) -> Result<Harvest, CrawlError> {
        let config = publisher_config(self.key(), HOSTS, MAX_DEPTH);
        let mut session = open_publisher_session(toolkit, options, config)?;

        session.on_html(CITATION_PDF_SELECTOR, |el, scope| {
            if is_flagship(scope) || !scope.options().full_text {
                return;
            }
            if let Some(link) = el.attr("content").and_then(|content| scope.normalize(content)) {
                scope.push_full_text(link);
            }
        });
        session.on_html("a.pdf-link[href]", |el, scope| {
            if !is_flagship(scope) {
                return;
            }
            let Some(href) = el.attr("href") else {
                return;
            };
            let pdf = with_host(scope.origin_or_page_host(), href);
            let related = pdf.replace(".full.pdf", "/related");
            if scope.options().full_text {
                scope.push_full_text(pdf);
            }
            if scope.options().supplementary {
                scope.visit(related);
            }
        });
        if options.supplementary {
            session.on_html(".supplementary-material a[href]", |el, scope| {
                if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
                    scope.push_supplementary(link);
                }
            });
            session.on_html("a.rewritten[href]", |el, scope| {
                if let Some(href) = el.attr("href") {
                    let link = with_host(scope.origin_or_page_host(), href);
                    scope.push_supplementary(link);
                }
            });
        }

        visit_or_log(&mut session, &options.doi_url()).await;
        Ok(session.into_harvest())
    }
}

fn is_flagship(scope: &Scope<'_>) -> bool {
    scope.origin_or_page_host().eq_ignore_ascii_case(FLAGSHIP_HOST)
}
