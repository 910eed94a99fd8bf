//! Application configuration loading for CLI defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const APP_DIR: &str = "doi-spider";
const CONFIG_FILE: &str = "config.toml";

/// TOML-backed file configuration for resolution defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Upstream proxy for every request (`http://host:port`, `socks5://...`).
    pub proxy: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Number of DOIs resolved concurrently.
    pub concurrency: Option<u8>,
    /// Collect the full text by default.
    pub full_text: Option<bool>,
    /// Collect supplementary attachments by default.
    pub supplementary: Option<bool>,
    /// User-Agent pool replacing the built-in browser strings.
    pub user_agents: Option<Vec<String>>,
    /// Headless render command; the DOI URL is appended as its last argument.
    pub renderer_command: Option<Vec<String>>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout}. Expected range: 1..=3600");
        }

        if let Some(concurrency) = self.concurrency
            && !(1..=32).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=32");
        }

        if let Some(proxy) = &self.proxy
            && proxy.trim().is_empty()
        {
            bail!("Invalid config value for `proxy`: expected a non-empty address");
        }
        validate_non_empty_list("user_agents", self.user_agents.as_deref())?;
        validate_non_empty_list("renderer_command", self.renderer_command.as_deref())?;

        Ok(())
    }
}

fn validate_non_empty_list(field: &str, value: Option<&[String]>) -> Result<()> {
    let Some(values) = value else {
        return Ok(());
    };
    if values.is_empty() || values.iter().any(|entry| entry.trim().is_empty()) {
        bail!("Invalid config value for `{field}`: expected a non-empty list of non-empty strings");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// The parsed config, or an empty one when no file was found.
    #[must_use]
    pub fn into_config(self) -> FileConfig {
        self.config.unwrap_or_default()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/doi-spider/config.toml`
/// 2. `$HOME/.config/doi-spider/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(
        env_var_non_empty_os("XDG_CONFIG_HOME"),
        env_var_non_empty_os("HOME"),
    )
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join(CONFIG_FILE));
    }

    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` when given, otherwise from the default path
/// if a file exists there.
///
/// An explicitly named file must exist.
pub fn load_file_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = read_config_file(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(read_config_file(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
            proxy = "http://127.0.0.1:8080"
            supplementary = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(cfg.supplementary, Some(true));
        assert_eq!(cfg.full_text, None);
        assert_eq!(cfg.timeout_secs, None);
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
            # resolution defaults
            proxy = "socks5://127.0.0.1:1080"
            timeout_secs = 45
            concurrency = 8
            full_text = false
            supplementary = true
            user_agents = ["agent-a", "agent-b"]
            renderer_command = ["node", "render.js"]
            verbosity = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.timeout_secs, Some(45));
        assert_eq!(cfg.concurrency, Some(8));
        assert_eq!(cfg.full_text, Some(false));
        assert_eq!(
            cfg.user_agents,
            Some(vec!["agent-a".to_string(), "agent-b".to_string()])
        );
        assert_eq!(
            cfg.renderer_command,
            Some(vec!["node".to_string(), "render.js".to_string()])
        );
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Debug));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout() {
        let err = parse_config_str("timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));

        let err = parse_config_str("timeout_secs = 3601").unwrap_err();
        assert!(err.to_string().contains("1..=3600"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_concurrency() {
        let err = parse_config_str("concurrency = 33").unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_concurrency_too_large_for_u8() {
        assert!(parse_config_str("concurrency = 300").is_err());
    }

    #[test]
    fn test_parse_config_rejects_empty_user_agent_list() {
        let err = parse_config_str("user_agents = []").unwrap_err();
        assert!(err.to_string().contains("user_agents"));
    }

    #[test]
    fn test_parse_config_rejects_blank_renderer_argument() {
        let err = parse_config_str(r#"renderer_command = ["node", " "]"#).unwrap_err();
        assert!(err.to_string().contains("renderer_command"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        assert!(parse_config_str("output_dir = \"/tmp\"").is_err());
    }

    #[test]
    fn test_parse_config_rejects_invalid_verbosity() {
        assert!(parse_config_str("verbosity = \"loud\"").is_err());
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        assert!(parse_config_str("full_text = \"yes\"").is_err());
    }

    #[test]
    fn test_verbosity_as_str() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Verbose.as_str(), "verbose");
        assert_eq!(VerbositySetting::Quiet.as_str(), "quiet");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
    }

    #[test]
    fn test_config_path_prefers_xdg_config_home() {
        let path = config_path_from(Some("/xdg".into()), Some("/home/user".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/doi-spider/config.toml"));
    }

    #[test]
    fn test_config_path_falls_back_to_home() {
        let path = config_path_from(None, Some("/home/user".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/user/.config/doi-spider/config.toml"));
        assert!(config_path_from(None, None).is_none());
    }

    #[test]
    fn test_load_explicit_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency = 2").unwrap();
        let loaded = load_file_config(Some(file.path())).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(file.path()));
        assert_eq!(loaded.into_config().concurrency, Some(2));
    }

    #[test]
    fn test_load_missing_explicit_config_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = load_file_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_explicit_config_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 0").unwrap();
        let err = load_file_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
