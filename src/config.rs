use serde::Deserialize;
use std::time::Duration;

/// Page sizes the customer list offers.
pub const PAGE_SIZES: [u32; 3] = [10, 20, 50];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Base URL of the REST backend, without a trailing slash.
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub default_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            api_base_url: "http://localhost:8080".to_string(),
            api_timeout_secs: 30,
            search_debounce_ms: 350,
            default_page_size: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            api_base_url: std::env::var("API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map_or(Ok(defaults.api_base_url), |url| normalize_base_url(&url))?,
            api_timeout_secs: std::env::var("API_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.api_timeout_secs.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_TIMEOUT_SECS must be a whole number"))
                .and_then(|secs: u64| {
                    if secs == 0 {
                        anyhow::bail!("API_TIMEOUT_SECS must be greater than zero");
                    }
                    Ok(secs)
                })?,
            search_debounce_ms: std::env::var("SEARCH_DEBOUNCE_MS")
                .unwrap_or_else(|_| defaults.search_debounce_ms.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SEARCH_DEBOUNCE_MS must be a whole number"))?,
            default_page_size: std::env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| defaults.default_page_size.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DEFAULT_PAGE_SIZE must be a whole number"))
                .and_then(|size: u32| {
                    if !PAGE_SIZES.contains(&size) {
                        anyhow::bail!("DEFAULT_PAGE_SIZE must be one of {:?}", PAGE_SIZES);
                    }
                    Ok(size)
                })?,
        };

        tracing::debug!("API base URL: {}", config.api_base_url);
        tracing::debug!("API timeout: {}s", config.api_timeout_secs);
        tracing::debug!("Search debounce: {}ms", config.search_debounce_ms);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Validates a backend base URL and strips trailing slashes.
pub fn normalize_base_url(url: &str) -> anyhow::Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("API_BASE_URL must start with http:// or https://");
    }
    reqwest::Url::parse(url).map_err(|e| anyhow::anyhow!("API_BASE_URL is invalid: {}", e))?;
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_url(" https://api.example.com ").unwrap(),
            "https://api.example.com"
        );
        assert!(normalize_base_url("localhost:8080").is_err());
        assert!(normalize_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search_debounce(), Duration::from_millis(350));
        assert_eq!(config.api_timeout(), Duration::from_secs(30));
        assert!(PAGE_SIZES.contains(&config.default_page_size));
    }
}
