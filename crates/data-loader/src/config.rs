//! Ingestion configuration.

use std::time::Duration;

/// Default user agent sent with dataset requests
pub const DEFAULT_USER_AGENT: &str = concat!("reel-stats/", env!("CARGO_PKG_VERSION"));

/// Where and how to fetch the dataset
///
/// ## Usage
/// ```ignore
/// let config = IngestConfig::new("https://example.org/AllMovies.tsv")
///     .with_timeout(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// HTTP(S) endpoint serving the tab-separated payload
    pub url: String,
    pub user_agent: String,
    /// Whole-request timeout; `None` waits as long as the server keeps sending
    pub request_timeout: Option<Duration>,
}

impl IngestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = IngestConfig::new("http://localhost/AllMovies.tsv")
            .with_user_agent("tests")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.url, "http://localhost/AllMovies.tsv");
        assert_eq!(config.user_agent, "tests");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_default_has_no_timeout() {
        let config = IngestConfig::default();
        assert!(config.request_timeout.is_none());
        assert!(config.user_agent.starts_with("reel-stats/"));
    }
}
