//! Structural checks on a built `HttpRequest`.
//!
//! Every check comes in two forms: a `check_*` function returning
//! `Result<(), Mismatch>`, and a method on `RequestAssert` that panics with
//! the mismatch. Neither performs I/O or touches the request.
//!
//! ```ignore
//! let request = CreateCommentRequest::new("Hi!", "ralph").build(&env)?;
//! assert_request(&request)
//!     .is_post()
//!     .hits_endpoint("/comments")
//!     .has_payload(&json!({"text": "Hi!", "username": "ralph"}));
//! ```

use comments_core::http::APPLICATION_JSON;
use comments_core::{Environment, HttpMethod, HttpRequest};
use serde_json::Value;
use thiserror::Error;

/// A failed check, naming what was inspected and both sides of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{what}: expected {expected}, got {actual}")]
pub struct Mismatch {
    pub what: String,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    fn new(what: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            what: what.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// The URL starts with the environment's base URL.
pub fn check_points_to_api(request: &HttpRequest, environment: &Environment) -> Result<(), Mismatch> {
    let base = environment.base_url();
    let url = request.url.as_str();
    let on_boundary = url
        .strip_prefix(base)
        .map(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
        .unwrap_or(false);
    if on_boundary {
        return Ok(());
    }
    Err(Mismatch::new("URL", format!("a URL under {base}"), url))
}

/// `Accept` and `Content-Type` are both `application/json`.
pub fn check_json_content_negotiation(request: &HttpRequest) -> Result<(), Mismatch> {
    for name in ["Accept", "Content-Type"] {
        let actual = request.header(name);
        if actual != Some(APPLICATION_JSON) {
            return Err(Mismatch::new(
                &format!("{name} header"),
                APPLICATION_JSON,
                actual.unwrap_or("<missing>"),
            ));
        }
    }
    Ok(())
}

pub fn check_method(request: &HttpRequest, expected: HttpMethod) -> Result<(), Mismatch> {
    if request.method == expected {
        return Ok(());
    }
    Err(Mismatch::new("method", expected.as_str(), request.method.as_str()))
}

/// Query parameter `name` is present with a non-empty value.
pub fn check_includes_authorization(request: &HttpRequest, name: &str) -> Result<(), Mismatch> {
    let authorized = request
        .url
        .query_pairs()
        .any(|(key, value)| key == name && !value.is_empty());
    if authorized {
        return Ok(());
    }
    Err(Mismatch::new(
        "authorization",
        format!("a non-empty `{name}` query parameter"),
        format!("query {:?}", request.url.query().unwrap_or("")),
    ))
}

/// The URL path ends with `suffix`.
pub fn check_hits_endpoint(request: &HttpRequest, suffix: &str) -> Result<(), Mismatch> {
    let path = request.url.path();
    if path.ends_with(suffix) {
        return Ok(());
    }
    Err(Mismatch::new("endpoint", format!("a path ending in {suffix}"), path))
}

/// The body parses as JSON equal to `expected`. Key order is irrelevant.
pub fn check_payload(request: &HttpRequest, expected: &Value) -> Result<(), Mismatch> {
    let Some(body) = request.body.as_deref() else {
        return Err(Mismatch::new("payload", expected.to_string(), "<no body>"));
    };
    let actual: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return Err(Mismatch::new("payload", expected.to_string(), format!("invalid JSON ({e}): {body}"))),
    };
    if &actual == expected {
        return Ok(());
    }
    Err(Mismatch::new("payload", expected.to_string(), actual.to_string()))
}

/// Each `(name, value)` pair occurs in the query, in any order.
pub fn check_query_items(request: &HttpRequest, expected: &[(&str, &str)]) -> Result<(), Mismatch> {
    let actual = request.query_pairs();
    let missing: Vec<String> = expected
        .iter()
        .filter(|(name, value)| !actual.iter().any(|(k, v)| k == name && v == value))
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let expected: Vec<String> = expected.iter().map(|(n, v)| format!("{n}={v}")).collect();
    let actual: Vec<String> = actual.iter().map(|(n, v)| format!("{n}={v}")).collect();
    Err(Mismatch::new(
        "query items",
        format!("[{}] (missing [{}])", expected.join(", "), missing.join(", ")),
        format!("[{}]", actual.join(", ")),
    ))
}

/// Start a chain of panicking checks on `request`.
pub fn assert_request(request: &HttpRequest) -> RequestAssert<'_> {
    RequestAssert { request }
}

/// Panicking form of the `check_*` functions, for use inside tests.
#[derive(Debug, Clone, Copy)]
pub struct RequestAssert<'a> {
    request: &'a HttpRequest,
}

impl RequestAssert<'_> {
    #[track_caller]
    pub fn points_to_api(&self, environment: &Environment) -> &Self {
        holds(check_points_to_api(self.request, environment));
        self
    }

    #[track_caller]
    pub fn has_json_content_negotiation(&self) -> &Self {
        holds(check_json_content_negotiation(self.request));
        self
    }

    #[track_caller]
    pub fn has_method(&self, method: HttpMethod) -> &Self {
        holds(check_method(self.request, method));
        self
    }

    #[track_caller]
    pub fn is_get(&self) -> &Self {
        self.has_method(HttpMethod::Get)
    }

    #[track_caller]
    pub fn is_post(&self) -> &Self {
        self.has_method(HttpMethod::Post)
    }

    #[track_caller]
    pub fn includes_authorization(&self, name: &str) -> &Self {
        holds(check_includes_authorization(self.request, name));
        self
    }

    #[track_caller]
    pub fn hits_endpoint(&self, suffix: &str) -> &Self {
        holds(check_hits_endpoint(self.request, suffix));
        self
    }

    #[track_caller]
    pub fn has_payload(&self, expected: &Value) -> &Self {
        holds(check_payload(self.request, expected));
        self
    }

    #[track_caller]
    pub fn contains_query_items(&self, expected: &[(&str, &str)]) -> &Self {
        holds(check_query_items(self.request, expected));
        self
    }
}

#[track_caller]
fn holds(result: Result<(), Mismatch>) {
    if let Err(mismatch) = result {
        panic!("request assertion failed: {mismatch}");
    }
}

#[cfg(test)]
mod tests {
    use comments_core::{CommentRequest, CommentsRequest, CreateCommentRequest, Request};
    use serde_json::json;

    use super::*;

    fn env() -> Environment {
        Environment::new("http://localhost:3000").unwrap().with_api_key("key")
    }

    #[test]
    fn points_to_api_respects_host_boundary() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        assert!(check_points_to_api(&req, &env()).is_ok());

        let other = Environment::new("http://localhost:300").unwrap();
        let err = check_points_to_api(&req, &other).unwrap_err();
        assert_eq!(err.expected, "a URL under http://localhost:300");
        assert_eq!(err.actual, "http://localhost:3000/comments/1?api_key=key");
    }

    #[test]
    fn content_negotiation_reports_missing_header() {
        let mut req = CommentRequest::new(1).build(&env()).unwrap();
        assert!(check_json_content_negotiation(&req).is_ok());

        req.headers.remove("content-type");
        let err = check_json_content_negotiation(&req).unwrap_err();
        assert_eq!(err.to_string(), "Content-Type header: expected application/json, got <missing>");
    }

    #[test]
    fn method_mismatch_names_both_methods() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        assert!(check_method(&req, HttpMethod::Get).is_ok());
        let err = check_method(&req, HttpMethod::Post).unwrap_err();
        assert_eq!(err.to_string(), "method: expected POST, got GET");
    }

    #[test]
    fn authorization_requires_non_empty_value() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        assert!(check_includes_authorization(&req, "api_key").is_ok());
        assert!(check_includes_authorization(&req, "token").is_err());

        let empty = Environment::new("http://localhost:3000").unwrap().with_api_key("");
        let req = CommentRequest::new(1).build(&empty).unwrap();
        assert!(check_includes_authorization(&req, "api_key").is_err());
    }

    #[test]
    fn hits_endpoint_is_a_suffix_match() {
        let req = CommentRequest::new(12).build(&env()).unwrap();
        assert!(check_hits_endpoint(&req, "/comments/12").is_ok());
        assert!(check_hits_endpoint(&req, "12").is_ok());
        let err = check_hits_endpoint(&req, "/comments/1").unwrap_err();
        assert_eq!(err.actual, "/comments/12");
    }

    #[test]
    fn payload_is_compared_structurally() {
        let req = CreateCommentRequest::new("Hi!", "ralph").build(&env()).unwrap();
        assert!(check_payload(&req, &json!({"username": "ralph", "text": "Hi!"})).is_ok());

        let err = check_payload(&req, &json!({"text": "Hi!"})).unwrap_err();
        assert!(err.actual.contains("ralph"), "{err}");
    }

    #[test]
    fn payload_without_body_fails() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        let err = check_payload(&req, &json!({})).unwrap_err();
        assert_eq!(err.actual, "<no body>");
    }

    #[test]
    fn payload_with_invalid_json_fails() {
        let mut req = CreateCommentRequest::new("Hi!", "ralph").build(&env()).unwrap();
        req.body = Some("{oops".to_string());
        let err = check_payload(&req, &json!({})).unwrap_err();
        assert!(err.actual.starts_with("invalid JSON"), "{err}");
    }

    #[test]
    fn query_items_ignore_order() {
        let req = CommentsRequest::page(3, 50).build(&env()).unwrap();
        assert!(check_query_items(&req, &[("per_page", "50"), ("page", "3"), ("api_key", "key")]).is_ok());
        assert!(check_query_items(&req, &[]).is_ok());

        let url = url::Url::parse("http://localhost:3000/comments?tag=a&tag=b&tag=a").unwrap();
        let req = HttpRequest::new(HttpMethod::Get, url);
        assert!(check_query_items(&req, &[("tag", "b"), ("tag", "a")]).is_ok());
        assert!(check_query_items(&req, &[("tag", "a"), ("tag", "a")]).is_ok());
        assert!(check_query_items(&req, &[("tag", "c")]).is_err());
    }

    #[test]
    fn query_items_report_what_is_missing() {
        let req = CommentsRequest::page(3, 50).build(&env()).unwrap();
        let err = check_query_items(&req, &[("page", "3"), ("page", "4")]).unwrap_err();
        assert!(err.expected.contains("missing [page=4]"), "{err}");
        assert_eq!(err.actual, "[api_key=key, page=3, per_page=50]");
    }

    #[test]
    fn fluent_assertions_chain() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        assert_request(&req)
            .points_to_api(&env())
            .has_json_content_negotiation()
            .is_get()
            .includes_authorization("api_key")
            .hits_endpoint("/comments/1");
    }

    #[test]
    #[should_panic(expected = "method: expected POST, got GET")]
    fn fluent_assertion_panics_with_mismatch() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        assert_request(&req).is_post();
    }
}
