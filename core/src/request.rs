//! The request contract: how to build an HTTP request and how to read its
//! response back into a typed value.
//!
//! # Design
//! Each endpoint is its own immutable value implementing `Request`. `build`
//! is pure and only needs the `Environment`; `parse` is pure over the
//! response. The default `parse` checks the status and decodes the JSON body
//! into `Self::Response`, so most endpoints only write `build`.

use serde::de::DeserializeOwned;

use crate::environment::Environment;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Request {
    /// Domain value produced from a successful response.
    type Response: DeserializeOwned;

    /// Describe the HTTP request. Must not perform I/O.
    fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError>;

    /// Turn the raw response into `Self::Response`.
    fn parse(&self, response: HttpResponse) -> Result<Self::Response, ApiError> {
        check_success(&response)?;
        decode_json(&response.body)
    }
}

/// Decode a JSON document into `T`. Missing or mistyped fields are a
/// `Decode` error.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map any non-2xx status to the appropriate `ApiError` variant.
pub fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(status_error(response))
}

/// Like `check_success`, but only `expected` counts as success.
pub fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(status_error(response))
}

fn status_error(response: &HttpResponse) -> ApiError {
    if response.status == 404 {
        return ApiError::NotFound;
    }
    ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::http::HttpMethod;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        pong: bool,
    }

    struct PingRequest;

    impl Request for PingRequest {
        type Response = Ping;

        fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError> {
            Ok(HttpRequest::json(HttpMethod::Get, environment.endpoint("/ping", &[])?))
        }
    }

    #[test]
    fn default_parse_decodes_json() {
        let ping = PingRequest.parse(HttpResponse::new(200, r#"{"pong":true}"#)).unwrap();
        assert_eq!(ping, Ping { pong: true });
    }

    #[test]
    fn default_parse_reports_missing_field() {
        let err = PingRequest.parse(HttpResponse::new(200, "{}")).unwrap_err();
        match err {
            ApiError::Decode(msg) => assert!(msg.contains("pong"), "{msg}"),
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn default_parse_reports_mistyped_field() {
        let err = PingRequest.parse(HttpResponse::new(200, r#"{"pong":"yes"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn default_parse_maps_404() {
        let err = PingRequest.parse(HttpResponse::new(404, "")).unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn default_parse_keeps_error_body() {
        let err = PingRequest.parse(HttpResponse::new(500, "boom")).unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn check_status_is_exact() {
        assert!(check_status(&HttpResponse::new(204, ""), 204).is_ok());
        assert!(matches!(
            check_status(&HttpResponse::new(200, ""), 204),
            Err(ApiError::Http { status: 200, .. })
        ));
    }

    #[test]
    fn build_is_deterministic() {
        let env = Environment::new("http://localhost:3000").unwrap();
        assert_eq!(PingRequest.build(&env).unwrap(), PingRequest.build(&env).unwrap());
    }
}
