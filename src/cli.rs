//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Resolve DOIs to full-text and supplementary download URLs.
///
/// Crawls the publisher's pages for each DOI and prints the URLs found, one
/// per line, in the order they were discovered. DOIs are read from the
/// arguments or, when none are given, from stdin (one per line).
#[derive(Parser, Debug)]
#[command(name = "doi-spider")]
#[command(author, version, about)]
pub struct Args {
    /// DOIs to resolve (e.g. 10.1038/s41586-020-2012-7)
    #[arg(value_name = "DOI")]
    pub dois: Vec<String>,

    /// Publisher strategy key (see --list-publishers); inferred from --url when omitted
    #[arg(short = 'p', long, value_name = "KEY")]
    pub publisher: Option<String>,

    /// Landing page the DOI already resolved to
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<Url>,

    /// Collect the full-text URL [default: true]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub full_text: Option<bool>,

    /// Collect supplementary URLs [default: false]
    #[arg(short = 's', long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub supplementary: Option<bool>,

    /// Proxy for every request (http://host:port, socks5://host:port)
    #[arg(long, value_name = "ADDR")]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds (1-3600) [default: 30]
    #[arg(short = 't', long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// DOIs resolved concurrently (1-32) [default: 4]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: Option<u8>,

    /// Print one JSON object per DOI instead of bare URLs
    #[arg(long)]
    pub json: bool,

    /// Config file to use instead of $XDG_CONFIG_HOME/doi-spider/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List the registered publisher keys and exit
    #[arg(long)]
    pub list_publishers: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["doi-spider"]).unwrap();
        assert!(args.dois.is_empty());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.json);
        assert_eq!(args.full_text, None);
        assert_eq!(args.supplementary, None);
        assert_eq!(args.concurrency, None);
    }

    #[test]
    fn test_cli_positional_dois() {
        let args =
            Args::try_parse_from(["doi-spider", "10.1038/s41586-020-2012-7", "10.1056/NEJMoa2001017"])
                .unwrap();
        assert_eq!(
            args.dois,
            vec!["10.1038/s41586-020-2012-7", "10.1056/NEJMoa2001017"]
        );
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["doi-spider", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["doi-spider", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["doi-spider", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_publisher_and_url() {
        let args = Args::try_parse_from([
            "doi-spider",
            "-p",
            "nature",
            "--url",
            "https://www.nature.com/articles/s41586-020-2012-7",
            "10.1038/s41586-020-2012-7",
        ])
        .unwrap();
        assert_eq!(args.publisher.as_deref(), Some("nature"));
        assert_eq!(args.url.unwrap().host_str(), Some("www.nature.com"));
    }

    #[test]
    fn test_cli_rejects_malformed_url() {
        let result = Args::try_parse_from(["doi-spider", "--url", "not a url"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_bare_supplementary_flag_means_true() {
        let args = Args::try_parse_from(["doi-spider", "-s", "10.1056/NEJMoa2001017"]).unwrap();
        assert_eq!(args.supplementary, Some(true));
        assert_eq!(args.dois, vec!["10.1056/NEJMoa2001017"]);
    }

    #[test]
    fn test_cli_full_text_accepts_explicit_value() {
        let args = Args::try_parse_from(["doi-spider", "--full-text=false"]).unwrap();
        assert_eq!(args.full_text, Some(false));
    }

    #[test]
    fn test_cli_timeout_range() {
        let args = Args::try_parse_from(["doi-spider", "-t", "60"]).unwrap();
        assert_eq!(args.timeout, Some(60));
        assert!(Args::try_parse_from(["doi-spider", "-t", "0"]).is_err());
        assert!(Args::try_parse_from(["doi-spider", "-t", "3601"]).is_err());
    }

    #[test]
    fn test_cli_concurrency_range() {
        let args = Args::try_parse_from(["doi-spider", "-c", "32"]).unwrap();
        assert_eq!(args.concurrency, Some(32));
        assert!(Args::try_parse_from(["doi-spider", "-c", "0"]).is_err());
        assert!(Args::try_parse_from(["doi-spider", "-c", "33"]).is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["doi-spider", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["doi-spider", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["doi-spider", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
