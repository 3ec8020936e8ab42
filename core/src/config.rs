//! Store connection settings.

/// Where json-server listens when started with the project defaults.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the base address.
pub const BASE_URL_ENV: &str = "JSON_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub base_url: String,
}

impl DbConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `JSON_SERVER_URL`, falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup(BASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
