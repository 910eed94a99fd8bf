//! CLI entry point for doi-spider.

use std::io::{self, IsTerminal, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use doi_spider::resolver::DEFAULT_TIMEOUT;
use doi_spider::{
    CommandRenderer, CrawlToolkit, ResolutionOptions, ResolveError, StrategyRegistry,
    build_default_strategy_registry,
};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::{FileConfig, VerbositySetting, load_file_config};
use cli::Args;

const DEFAULT_CONCURRENCY: u8 = 4;

/// One line of `--json` output.
#[derive(Debug, Serialize)]
struct ResolutionRecord<'a> {
    doi: &'a str,
    publisher: &'a str,
    urls: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let loaded = load_file_config(args.config.as_deref())?;
    let config_path = loaded.path.clone();
    let config = loaded.into_config();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = if args.quiet {
        "error"
    } else {
        match (args.verbose, config.verbosity) {
            (0, None | Some(VerbositySetting::Default)) => "info",
            (0, Some(VerbositySetting::Quiet)) => "error",
            (1, _) | (0, Some(VerbositySetting::Verbose)) => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(
        config_path = ?config_path,
        verbosity = config.verbosity.map(VerbositySetting::as_str),
        "Config loaded"
    );
    debug!(?args, ?config, "CLI arguments and config parsed");

    let registry = build_default_strategy_registry();
    if args.list_publishers {
        let mut stdout = io::stdout().lock();
        for key in registry.keys() {
            writeln!(stdout, "{key}")?;
        }
        return Ok(());
    }

    let dois = read_dois(&args.dois)?;
    if dois.is_empty() {
        info!("No DOI provided. Pass DOIs as arguments or pipe them via stdin.");
        info!("Example: doi-spider --publisher nature 10.1038/s41586-020-2012-7");
        return Ok(());
    }

    let publisher = select_publisher(&registry, &args)?;
    let template = build_options_template(&args, &config);
    let toolkit = build_toolkit(&config);
    let concurrency = usize::from(
        args.concurrency
            .or(config.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY),
    );
    info!(dois = dois.len(), publisher, concurrency, "Starting resolution");

    let registry = &registry;
    let toolkit = &toolkit;
    let template = &template;
    let mut results = stream::iter(dois.iter())
        .map(|doi| async move {
            let options = ResolutionOptions {
                doi: doi.clone(),
                ..template.clone()
            };
            (doi, registry.resolve(publisher, &options, toolkit).await)
        })
        .buffered(concurrency);

    let mut failed = 0usize;
    let mut stdout = io::stdout().lock();
    while let Some((doi, outcome)) = results.next().await {
        let (urls, error) = match outcome {
            Ok(urls) => (urls, None),
            Err(error) => {
                failed += 1;
                warn!(doi = %doi, error = %error, "Resolution failed");
                (Vec::new(), Some(error.to_string()))
            }
        };
        if args.json {
            let record = ResolutionRecord {
                doi,
                publisher,
                urls: &urls,
                error,
            };
            writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
        } else {
            for url in &urls {
                writeln!(stdout, "{url}")?;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} DOIs failed to resolve", dois.len());
    }
    Ok(())
}

/// DOIs from the arguments, or from stdin when none were given. Blank lines
/// and `#` comments are skipped.
fn read_dois(from_args: &[String]) -> Result<Vec<String>> {
    let input = if !from_args.is_empty() {
        from_args.join("\n")
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        String::new()
    };
    Ok(input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect())
}

fn select_publisher(registry: &StrategyRegistry, args: &Args) -> Result<&'static str> {
    if let Some(key) = args.publisher.as_deref() {
        return registry
            .get(key)
            .map(|strategy| strategy.key())
            .ok_or_else(|| ResolveError::unknown_publisher(key).into());
    }
    let Some(url) = &args.url else {
        bail!(
            "No publisher selected.\n  Suggestion: Pass --publisher <KEY> (see --list-publishers) or --url <landing page>"
        );
    };
    let host = url.host_str().unwrap_or_default();
    registry
        .find_by_host(host)
        .map(|strategy| strategy.key())
        .ok_or_else(|| ResolveError::no_strategy_for_host(host).into())
}

/// Options shared by every DOI of this run; CLI flags override the config file.
fn build_options_template(args: &Args, config: &FileConfig) -> ResolutionOptions {
    let timeout = args
        .timeout
        .or(config.timeout_secs)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let mut options = ResolutionOptions::new(String::new())
        .with_full_text(args.full_text.or(config.full_text).unwrap_or(true))
        .with_supplementary(args.supplementary.or(config.supplementary).unwrap_or(false))
        .with_timeout(timeout);
    if let Some(proxy) = args.proxy.as_ref().or(config.proxy.as_ref()) {
        options = options.with_proxy(proxy.clone());
    }
    if let Some(url) = &args.url {
        options = options.with_origin_url(url.clone());
    }
    options
}

fn build_toolkit(config: &FileConfig) -> CrawlToolkit {
    let mut toolkit = CrawlToolkit::http();
    if let Some(user_agents) = &config.user_agents {
        toolkit = toolkit.with_user_agents(user_agents.clone());
    }
    if let Some(renderer) = config
        .renderer_command
        .as_deref()
        .and_then(CommandRenderer::from_command_line)
    {
        debug!(?renderer, "Headless renderer configured");
        toolkit = toolkit.with_renderer(Arc::new(renderer));
    }
    toolkit
}
