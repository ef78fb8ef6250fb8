//! HTTP transport types for the build/parse pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. Requests
//! are built as `HttpRequest` values and responses are parsed from
//! `HttpResponse` values; neither side touches the network. Executing the
//! round-trip is the job of a `Transport`.
//!
//! Headers use `http::HeaderMap`, so lookups are case-insensitive. The URL is
//! kept parsed, which means a built request always has a valid absolute URL.

use std::fmt;

use ::http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::error::ApiError;

pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Produced by `Request::build`. Building one never performs I/O; the value
/// is handed to a `Transport` (or inspected by assertions) afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A request that sends and accepts JSON.
    pub fn json(method: HttpMethod, url: Url) -> Self {
        Self::new(method, url)
            .with_header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON))
            .with_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
    }

    /// Insert a header, replacing any existing value under the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `payload` to JSON and use it as the body.
    pub fn with_json_body<T: Serialize>(mut self, payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Header value as a string, if present and valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query pairs in the order they appear in the URL.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

/// An HTTP response described as plain data.
///
/// Returned by a `Transport` after executing an `HttpRequest`, then passed to
/// `Request::parse` for interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
