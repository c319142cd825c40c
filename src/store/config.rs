//! Counter store connection settings

use std::time::Duration;

/// Connection settings for the counter store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Store URL (e.g., "redis://localhost:6379/0" or "memory://")
    pub url: String,

    /// Timeout for establishing the connection
    /// Default: 5 seconds
    pub connection_timeout: Duration,

    /// Timeout for each individual command
    /// Default: 1 second
    pub command_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            url: "redis://localhost:6379/0".to_string(),
            connection_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(1),
        }
    }
}

impl StoreConfig {
    /// Create a config with the specified URL and default timeouts
    pub fn with_url(url: impl Into<String>) -> Self {
        StoreConfig {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the command timeout
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Whether this URL selects the process-local store
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }

    /// URL with any password replaced, safe for logs
    pub fn redacted_url(&self) -> String {
        let Some(scheme_end) = self.url.find("://") else {
            return self.url.clone();
        };
        let rest = &self.url[scheme_end + 3..];
        match rest.rfind('@') {
            Some(at) => format!("{}://***@{}", &self.url[..scheme_end], &rest[at + 1..]),
            None => self.url.clone(),
        }
    }
}
