//! Where requests are sent, and with which credentials.
//!
//! Configuration is read from the process environment with fallbacks, so a
//! test suite can point the same requests at a mock server by exporting
//! `COMMENTS_BASE_URL`.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Name of the query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// The API a request is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    base_url: Url,
    api_key: Option<String>,
}

impl Environment {
    /// Parse `base_url`; a trailing slash is ignored.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url} cannot be a base URL")));
        }
        Ok(Self {
            base_url,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Reads `COMMENTS_BASE_URL` and `COMMENTS_API_KEY`.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = env::var("COMMENTS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let environment = Self::new(&base_url)?;
        Ok(match env::var("COMMENTS_API_KEY") {
            Ok(key) if !key.is_empty() => environment.with_api_key(key),
            _ => environment,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Absolute URL for `path` (e.g. `/comments/1`) with the API key and the
    /// given query pairs appended.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url(), path.trim_start_matches('/')))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                pairs.append_pair(API_KEY_PARAM, key);
            }
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

/// Execution settings for a `Client`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound on a single round-trip.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Reads `COMMENTS_TIMEOUT_MS`, falling back to the default when unset or
    /// unparsable.
    pub fn from_env() -> Self {
        let timeout_ms = match env::var("COMMENTS_TIMEOUT_MS") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("Invalid COMMENTS_TIMEOUT_MS {:?}, using {}ms", value, DEFAULT_TIMEOUT_MS);
                DEFAULT_TIMEOUT_MS
            }),
            Err(_) => DEFAULT_TIMEOUT_MS,
        };
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let env = Environment::new("http://localhost:3000/").unwrap();
        assert_eq!(env.base_url(), "http://localhost:3000");
        let url = env.endpoint("/comments", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/comments");
    }

    #[test]
    fn base_path_is_kept() {
        let env = Environment::new("https://api.example.com/v1").unwrap();
        let url = env.endpoint("comments/7", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/comments/7");
    }

    #[test]
    fn api_key_comes_before_request_query() {
        let env = Environment::new("http://localhost:3000").unwrap().with_api_key("s3cret");
        let url = env.endpoint("/comments", &[("page", "2".to_string())]).unwrap();
        assert_eq!(url.query(), Some("api_key=s3cret&page=2"));
    }

    #[test]
    fn query_values_are_encoded() {
        let env = Environment::new("http://localhost:3000").unwrap();
        let url = env.endpoint("/comments", &[("q", "a b&c".to_string())]).unwrap();
        assert_eq!(url.query(), Some("q=a+b%26c"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(Environment::new("not a url"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(Environment::new("mailto:ralph@example.com"), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(ClientConfig::default().timeout, Duration::from_secs(30));
    }
}
