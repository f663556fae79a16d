// SPDX-License-Identifier: Apache-2.0

use url::Url;

/// Environment variable holding the feed endpoint.
pub const ENDPOINT_ENV: &str = "SOCIALFEED_ENDPOINT";

/// Why a [`FeedConfig`] could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No endpoint was configured.
    MissingEndpoint,
    /// The endpoint is not an absolute http(s) URL.
    InvalidEndpoint(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::MissingEndpoint => {
                write!(f, "no feed endpoint configured (set {ENDPOINT_ENV})")
            }
            ConfigError::InvalidEndpoint(endpoint) => {
                write!(f, "invalid feed endpoint {endpoint:?}: expected an http(s) URL")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the user feed is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    endpoint: Url,
}

impl FeedConfig {
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidEndpoint(endpoint.to_owned());
        let url = Url::parse(endpoint.trim()).map_err(|_| invalid())?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(Self { endpoint: url }),
            _ => Err(invalid()),
        }
    }

    /// Reads the endpoint from [`ENDPOINT_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the endpoint through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(ENDPOINT_ENV) {
            Some(endpoint) if !endpoint.trim().is_empty() => Self::new(&endpoint),
            _ => Err(ConfigError::MissingEndpoint),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_valid_endpoints() {
        let config = FeedConfig::new("https://feed.example.com/users.json").unwrap();
        assert_eq!(config.endpoint(), "https://feed.example.com/users.json");
        assert!(FeedConfig::new(" http://localhost:8080/users ").is_ok());
    }

    #[test]
    fn test_invalid_endpoints() {
        for endpoint in ["", "feed.example.com", "ftp://feed.example.com/x", "file:///tmp/x"] {
            assert_eq!(
                FeedConfig::new(endpoint),
                Err(ConfigError::InvalidEndpoint(endpoint.to_owned())),
                "endpoint {endpoint:?}"
            );
        }
    }

    #[test]
    fn test_from_lookup() {
        let config =
            FeedConfig::from_lookup(|name| (name == ENDPOINT_ENV).then(|| "http://h/u".into()))
                .unwrap();
        assert_eq!(config.endpoint(), "http://h/u");
        assert_eq!(
            FeedConfig::from_lookup(|_| None),
            Err(ConfigError::MissingEndpoint)
        );
        assert_eq!(
            FeedConfig::from_lookup(|_| Some("  ".into())),
            Err(ConfigError::MissingEndpoint)
        );
    }
}
