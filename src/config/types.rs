use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Tag-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl loop tuning
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of article fetches in flight at once
    #[serde(rename = "max-concurrent-articles", default = "default_max_concurrent")]
    pub max_concurrent_articles: u32,

    /// Delay between successive listing page fetches (milliseconds)
    #[serde(rename = "page-delay", default = "default_page_delay")]
    pub page_delay: u64,

    /// Delay before each article dispatch (milliseconds)
    #[serde(rename = "dispatch-delay", default)]
    pub dispatch_delay: u64,

    /// Additional attempts for transient fetch failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Hard cap on listing pages; 0 means unbounded
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,

    /// Pagination termination heuristic
    #[serde(rename = "stop-policy", default)]
    pub stop_policy: StopPolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_articles: default_max_concurrent(),
            page_delay: default_page_delay(),
            dispatch_delay: 0,
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            max_pages: 0,
            stop_policy: StopPolicy::default(),
        }
    }
}

/// When to stop paginating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    /// Stop on the first page that yields no unclaimed article URLs
    #[default]
    NoNovelLinks,

    /// Stop only on a page where the list selector matches nothing
    NoMatches,
}

/// Site addressing and selectors
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Human-readable source name written into the output document
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Scheme and host of the site, e.g. `https://www.kompas.com`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing path template with `{category}` and `{page}` placeholders
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Selector for anchors on a listing page
    #[serde(rename = "list-selector")]
    pub list_selector: String,

    /// Selector for the article body container
    #[serde(rename = "content-selector")]
    pub content_selector: String,

    /// Selector for the publication date
    #[serde(rename = "date-selector")]
    pub date_selector: String,

    /// Optional selector for the headline on the article page
    #[serde(rename = "title-selector", default)]
    pub title_selector: Option<String>,
}

/// HTTP transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Extra request headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            headers: BTreeMap::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the JSON document is written into
    pub directory: String,
}

fn default_max_concurrent() -> u32 {
    8
}

fn default_page_delay() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_delay() -> u64 {
    500
}

fn default_site_name() -> String {
    "unknown".to_string()
}

fn default_listing_path() -> String {
    "/tag/{category}?page={page}".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
