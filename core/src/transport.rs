//! Executing an `HttpRequest` and handing back the `HttpResponse`.
//!
//! # Design
//! `Transport` is the only place I/O happens. The `Client` takes one by
//! value, so tests inject a double and production code uses
//! `UreqTransport`. Non-2xx statuses are returned as data; interpreting them
//! is the request's `parse`.

use async_trait::async_trait;
use http::HeaderMap;
use ureq::Agent;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    /// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
    /// responses reach `Request::parse`.
    pub fn new() -> Self {
        let agent = Agent::config_builder().http_status_as_error(false).build().new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

fn execute(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let url = request.url.as_str();
    let result = match request.method {
        HttpMethod::Get => with_headers(agent.get(url), &request.headers)?.call(),
        HttpMethod::Delete => with_headers(agent.delete(url), &request.headers)?.call(),
        HttpMethod::Post => send_body(with_headers(agent.post(url), &request.headers)?, request.body),
        HttpMethod::Put => send_body(with_headers(agent.put(url), &request.headers)?, request.body),
        HttpMethod::Patch => send_body(with_headers(agent.patch(url), &request.headers)?, request.body),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse { status, headers, body })
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &HeaderMap,
) -> Result<ureq::RequestBuilder<B>, ApiError> {
    for (name, value) in headers {
        let value = value
            .to_str()
            .map_err(|e| ApiError::Transport(format!("header {name}: {e}")))?;
        builder = builder.header(name.as_str(), value);
    }
    Ok(builder)
}
