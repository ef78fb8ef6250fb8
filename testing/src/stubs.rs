//! A `Transport` that answers from registered stubs instead of the network.
//!
//! # Design
//! Stubs are keyed by a built `HttpRequest`: method, URL, every header the
//! built request carried, and the body (compared as JSON when both sides
//! parse). The transport is a cheap handle onto shared state, so a test keeps
//! one clone for registering stubs and hands another to the `Client`.
//! Separate `StubTransport::new()` instances never see each other's stubs.

use std::sync::Arc;

use async_trait::async_trait;
use comments_core::http::{HttpMethod, HttpRequest, HttpResponse};
use comments_core::{ApiError, Transport};
use http::HeaderMap;
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;

use crate::fixtures::Fixtures;

/// One registered request-matching rule and its canned response.
#[derive(Debug, Clone)]
pub struct Stub {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub response: HttpResponse,
}

impl Stub {
    /// Match exactly what `request` would send.
    pub fn for_request(request: &HttpRequest, response: HttpResponse) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            response,
        }
    }

    pub fn matches(&self, request: &HttpRequest) -> bool {
        self.method == request.method
            && self.url == request.url
            && self.headers.iter().all(|(name, value)| {
                request.headers.get_all(name).iter().any(|v| v == value)
            })
            && same_body(self.body.as_deref(), request.body.as_deref())
    }
}

fn same_body(expected: Option<&str>, actual: Option<&str>) -> bool {
    match (expected, actual) {
        (None, None) => true,
        (Some(expected), Some(actual)) => {
            match (serde_json::from_str::<Value>(expected), serde_json::from_str::<Value>(actual)) {
                (Ok(expected), Ok(actual)) => expected == actual,
                _ => expected == actual,
            }
        }
        _ => false,
    }
}

#[derive(Debug, Default)]
struct Registry {
    stubs: Vec<Stub>,
    received: Vec<HttpRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    registry: Arc<Mutex<Registry>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, stub: Stub) {
        self.registry.lock().stubs.push(stub);
    }

    /// Answer `request` with `status` and `body`.
    pub fn stub(&self, request: &HttpRequest, status: u16, body: impl Into<String>) {
        self.register(Stub::for_request(request, HttpResponse::new(status, body)));
    }

    /// Answer `request` with `status` and the contents of fixture `name`.
    /// Fails the test if the fixture is missing or not JSON.
    #[track_caller]
    pub fn stub_fixture(&self, request: &HttpRequest, status: u16, fixtures: &Fixtures, name: &str) {
        let body = fixtures.load(name);
        self.stub(request, status, body);
    }

    /// Drop every stub and forget every received request.
    pub fn reset(&self) {
        let mut registry = self.registry.lock();
        registry.stubs.clear();
        registry.received.clear();
    }

    /// Guard that calls `reset` when dropped, for per-test cleanup.
    pub fn scope(&self) -> StubScope {
        StubScope {
            transport: self.clone(),
        }
    }

    pub fn stub_count(&self) -> usize {
        self.registry.lock().stubs.len()
    }

    /// Requests seen so far, matched or not, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.registry.lock().received.clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut registry = self.registry.lock();
        let response = registry
            .stubs
            .iter()
            .rev()
            .find(|stub| stub.matches(&request))
            .map(|stub| stub.response.clone());
        let description = format!("{} {}", request.method, request.url);
        registry.received.push(request);

        match response {
            Some(response) => Ok(response),
            None => {
                log::warn!("no stub registered for {}", description);
                Err(ApiError::Transport(format!("no stub registered for {description}")))
            }
        }
    }
}

/// Clears the owning `StubTransport` on drop.
#[derive(Debug)]
pub struct StubScope {
    transport: StubTransport,
}

impl Drop for StubScope {
    fn drop(&mut self) {
        self.transport.reset();
    }
}
