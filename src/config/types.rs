use serde::Deserialize;

/// Default browser-like User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:106.0) Gecko/20100101 Firefox/106.0";

/// Default Accept header
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Default Accept-Language header
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Main configuration structure for Sumi-Audit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub headers: HeaderConfig,
    pub scope: ScopeConfig,
    pub output: OutputConfig,
    #[serde(rename = "run")]
    pub runs: Vec<RunEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Size of the worker pool and of every batch pulled from the frontier
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Hard per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Maximum redirect hops followed by a single request
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,

    /// Error-text markers identifying local connection-pool saturation
    #[serde(rename = "pool-exhaustion-markers")]
    pub pool_exhaustion_markers: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            request_timeout_ms: 5_000,
            max_redirects: 10,
            pool_exhaustion_markers: vec![
                "connection pool".to_string(),
                "Too many open files".to_string(),
            ],
        }
    }
}

/// Headers sent with every request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// URL exclusion rules applied to every discovered link
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// File extensions (without the dot) that are never fetched
    #[serde(rename = "excluded-extensions")]
    pub excluded_extensions: Vec<String>,

    /// Substrings that exclude any URL containing them
    #[serde(rename = "ignore-substrings")]
    pub ignore_substrings: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            excluded_extensions: vec!["ipynb".to_string()],
            ignore_substrings: vec!["twitter".to_string(), "kaggle.com/code".to_string()],
        }
    }
}

/// Report persistence format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Sqlite,
    Markdown,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory reports are written into
    pub directory: String,

    pub format: OutputFormat,

    /// File name of the SQLite database inside `directory`
    #[serde(rename = "database-name")]
    pub database_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            format: OutputFormat::Csv,
            database_name: "broken-links.db".to_string(),
        }
    }
}

/// One crawl run: a start URL and the label its report is named after
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunEntry {
    #[serde(rename = "start-url")]
    pub start_url: String,

    pub label: String,
}
