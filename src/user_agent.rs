//! User-Agent policy for crawl sessions.
//!
//! Most publisher sites serve stripped-down or blocked pages to obvious bots,
//! so sessions rotate through a pool of browser User-Agents by default.
//! Strategies for sites that reject rotating agents use the fixed project UA.

use rand::seq::SliceRandom;

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/doi-spider";

const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.67",
];

/// Fixed User-Agent identifying the tool.
#[must_use]
pub fn default_project_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("doi-spider/{version} (research-tool; +{PROJECT_UA_URL})")
}

/// Built-in browser User-Agent pool used for rotation.
#[must_use]
pub fn default_browser_user_agents() -> Vec<String> {
    BROWSER_USER_AGENTS
        .iter()
        .map(|ua| (*ua).to_string())
        .collect()
}

/// How a transport chooses the `User-Agent` header per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentPolicy {
    /// Pick a random entry from the pool for every request.
    Rotating(Vec<String>),
    /// Always send the same value.
    Fixed(String),
}

impl UserAgentPolicy {
    /// Returns the User-Agent for the next request.
    ///
    /// An empty rotation pool falls back to the project UA.
    #[must_use]
    pub fn pick(&self) -> String {
        match self {
            Self::Rotating(pool) => pool
                .choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_else(default_project_user_agent),
            Self::Fixed(value) => value.clone(),
        }
    }
}

impl Default for UserAgentPolicy {
    fn default() -> Self {
        Self::Rotating(default_browser_user_agents())
    }
}
