use serde::Deserialize;

/// Main configuration structure for Tidewatch
///
/// Every section and field has a default, so an empty TOML file (or no file
/// at all) yields a working configuration for the default listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub layout: ListingLayout,
    pub output: OutputConfig,
}

/// Crawl engine behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// First listing page to crawl
    pub start_url: String,

    /// Page budget for an incremental crawl
    pub max_pages: u32,

    /// Upper bound for the doubled page budget of a full crawl
    pub full_crawl_page_ceiling: u32,

    /// Pause between consecutive page fetches (milliseconds)
    pub politeness_delay_ms: u64,

    /// Safety buffer subtracted from the last crawl time (minutes)
    pub cutoff_buffer_minutes: i64,

    /// Pages with fewer in-range records than this are reported as sparse
    pub sparse_page_threshold: Option<usize>,

    /// Stop the crawl on a sparse page instead of only logging it
    pub stop_on_sparse_page: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: "https://qn.bjx.com.cn/zq".to_string(),
            max_pages: 10,
            full_crawl_page_ceiling: 20,
            politeness_delay_ms: 1000,
            cutoff_buffer_minutes: 60,
            sparse_page_threshold: Some(20),
            stop_on_sparse_page: false,
        }
    }
}

/// HTTP fetching, retry, and block detection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Socket timeout of the first attempt (seconds)
    pub timeout_secs: u64,

    /// Added to the timeout for each further attempt (seconds)
    pub timeout_step_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Total attempts per page, including the first
    pub max_retries: u32,

    /// Base of the exponential backoff (milliseconds)
    pub backoff_base_ms: u64,

    /// Extra wait after a timeout-class failure (milliseconds)
    pub timeout_penalty_ms: u64,

    /// Extra wait after any other failure (milliseconds)
    pub generic_penalty_ms: u64,

    /// Bodies shorter than this many characters are treated as blocked
    pub min_body_length: usize,

    /// Case-insensitive substrings that mark a block page
    pub block_indicators: Vec<String>,

    /// User-agent pool rotated across attempts
    pub user_agents: Vec<String>,

    /// Accept-Language header sent with every request
    pub accept_language: String,

    /// Probe the start URL once before crawling
    pub preflight_check: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            timeout_step_secs: 5,
            connect_timeout_secs: 10,
            max_retries: 5,
            backoff_base_ms: 1000,
            timeout_penalty_ms: 5000,
            generic_penalty_ms: 2000,
            min_body_length: 100,
            block_indicators: default_block_indicators(),
            user_agents: default_user_agents(),
            accept_language: "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
            preflight_check: true,
        }
    }
}

fn default_block_indicators() -> Vec<String> {
    [
        "captcha",
        "access denied",
        "request blocked",
        "anti-bot",
        "cloudflare",
        "验证码",
        "拒绝访问",
        "非法请求",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// CSS selectors and labels describing the listing page markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingLayout {
    /// Element wrapping the article list
    pub container: String,

    /// List element inside the container
    pub list: String,

    /// One article entry inside the list
    pub item: String,

    /// Link inside an entry (title + href)
    pub link: String,

    /// Element inside an entry holding the date text
    pub date: String,

    /// Element wrapping the pagination controls
    pub pagination: String,

    /// Visible label of the "next page" control
    pub next_label: String,

    /// Class marking a disabled pagination control
    pub disabled_class: String,
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self {
            container: "div.cc-list-content".to_string(),
            list: "ul".to_string(),
            item: "li".to_string(),
            link: "a".to_string(),
            date: "span".to_string(),
            pagination: "div.cc-paging".to_string(),
            next_label: "下一页".to_string(),
            disabled_class: "disable".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Persisted record set, read back on incremental runs
    pub json_path: String,

    /// Consulted in order when `json_path` does not exist yet
    pub fallback_json_paths: Vec<String>,

    /// CSV rendering of the record set (skipped when unset)
    pub csv_path: Option<String>,

    /// Crawl state file
    pub state_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "articles.json".to_string(),
            fallback_json_paths: Vec::new(),
            csv_path: Some("articles.csv".to_string()),
            state_path: "crawl_state.json".to_string(),
        }
    }
}
