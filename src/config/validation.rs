use crate::config::types::{Config, CrawlerConfig, FetcherConfig, ListingLayout, OutputConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_layout(&config.layout)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl engine configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url must use http or https, got '{}'",
            config.start_url
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.full_crawl_page_ceiling < 1 {
        return Err(ConfigError::Validation(format!(
            "full_crawl_page_ceiling must be >= 1, got {}",
            config.full_crawl_page_ceiling
        )));
    }

    if config.cutoff_buffer_minutes < 0 {
        return Err(ConfigError::Validation(format!(
            "cutoff_buffer_minutes cannot be negative, got {}",
            config.cutoff_buffer_minutes
        )));
    }

    if config.sparse_page_threshold == Some(0) {
        return Err(ConfigError::Validation(
            "sparse_page_threshold must be >= 1 when set".to_string(),
        ));
    }

    if config.stop_on_sparse_page && config.sparse_page_threshold.is_none() {
        return Err(ConfigError::Validation(
            "stop_on_sparse_page requires sparse_page_threshold".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs and connect_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    if config.block_indicators.iter().any(|i| i.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "block_indicators cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every layout selector parses
fn validate_layout(layout: &ListingLayout) -> Result<(), ConfigError> {
    let selectors = [
        ("container", &layout.container),
        ("list", &layout.list),
        ("item", &layout.item),
        ("link", &layout.link),
        ("date", &layout.date),
        ("pagination", &layout.pagination),
    ];

    for (name, selector) in selectors {
        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} selector '{}': {:?}", name, selector, e))
        })?;
    }

    if layout.next_label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "next_label cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    if config.state_path.is_empty() {
        return Err(ConfigError::Validation(
            "state_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_start_url() {
        let mut config = CrawlerConfig::default();
        config.start_url = "not a url".to_string();
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.start_url = "ftp://example.com/list".to_string();
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_sparse_page_settings() {
        let mut config = CrawlerConfig::default();
        config.sparse_page_threshold = Some(0);
        assert!(validate_crawler_config(&config).is_err());

        config.sparse_page_threshold = None;
        config.stop_on_sparse_page = true;
        assert!(validate_crawler_config(&config).is_err());

        config.sparse_page_threshold = Some(5);
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_validate_fetcher_config() {
        let mut config = FetcherConfig::default();
        config.max_retries = 0;
        assert!(validate_fetcher_config(&config).is_err());

        let mut config = FetcherConfig::default();
        config.user_agents.clear();
        assert!(validate_fetcher_config(&config).is_err());

        let mut config = FetcherConfig::default();
        config.block_indicators.push("  ".to_string());
        assert!(validate_fetcher_config(&config).is_err());
    }

    #[test]
    fn test_validate_layout_rejects_bad_selector() {
        let mut layout = ListingLayout::default();
        layout.container = "div[".to_string();
        assert!(matches!(
            validate_layout(&layout),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_validate_output_config() {
        let mut config = OutputConfig::default();
        config.csv_path = Some(String::new());
        assert!(validate_output_config(&config).is_err());

        config.csv_path = None;
        assert!(validate_output_config(&config).is_ok());

        config.state_path = String::new();
        assert!(validate_output_config(&config).is_err());
    }
}
