//! Headless-render collaborator for JavaScript-gated supplementary listings.
//!
//! Some publishers only build their attachment lists client-side, which a
//! plain page fetch never sees. Strategies for those sites hand the DOI URL to
//! a [`SupplementaryRenderer`] instead of registering selectors.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::CrawlError;

/// Produces supplementary URLs for pages that need a rendering browser.
#[async_trait]
pub trait SupplementaryRenderer: Send + Sync {
    /// Returns the attachment URLs found on the rendered `doi_url` page.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Render`] when rendering fails or times out.
    async fn supplementary_urls(
        &self,
        doi_url: &str,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<Vec<String>, CrawlError>;
}

/// Renderer used when no headless browser is configured; finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRenderer;

#[async_trait]
impl SupplementaryRenderer for NoRenderer {
    async fn supplementary_urls(
        &self,
        doi_url: &str,
        _timeout: Duration,
        _proxy: Option<&str>,
    ) -> Result<Vec<String>, CrawlError> {
        debug!(url = %doi_url, "No headless renderer configured; skipping rendered supplementary lookup");
        Ok(Vec::new())
    }
}

/// Delegates rendering to an external program (e.g. a headless-browser script).
///
/// The program receives the DOI URL as its last argument, the proxy through
/// `HTTPS_PROXY`/`HTTP_PROXY`, and must print one URL per line on stdout.
/// Lines that are not `http(s)` URLs are ignored.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    /// Creates a renderer from a command line (`program` followed by arguments).
    ///
    /// Returns `None` for an empty command line.
    #[must_use]
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl SupplementaryRenderer for CommandRenderer {
    async fn supplementary_urls(
        &self,
        doi_url: &str,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<Vec<String>, CrawlError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(doi_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(proxy) = proxy {
            command.env("HTTPS_PROXY", proxy).env("HTTP_PROXY", proxy);
        }

        debug!(program = %self.program, url = %doi_url, "Running headless renderer");
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| CrawlError::render(format!("renderer timed out after {timeout:?}")))?
            .map_err(|error| CrawlError::render(format!("cannot run '{}': {error}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(program = %self.program, status = %output.status, stderr = %stderr.trim(), "Renderer exited with failure");
            return Err(CrawlError::render(format!(
                "'{}' exited with {}",
                self.program, output.status
            )));
        }

        Ok(parse_rendered_urls(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_rendered_urls(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .map(str::to_string)
        .collect()
}
