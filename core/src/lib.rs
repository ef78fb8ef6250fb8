//! Typed request/response contract for the comments API.
//!
//! # Overview
//! Every endpoint is a value implementing `Request`: `build` describes the
//! `HttpRequest` without touching the network, `parse` turns the
//! `HttpResponse` into a domain type or an `ApiError`. A `Client` executes
//! requests over an injected `Transport`.
//!
//! # Design
//! - Building and parsing are pure, so requests can be inspected in tests
//!   without I/O.
//! - `parse` defaults to a status check plus JSON decoding; endpoints only
//!   override it when the response is not a JSON document.
//! - The transport is a trait object boundary, which is where tests plug in
//!   stubs.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod comments;
pub mod environment;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;

pub use client::{Client, Task};
pub use comments::{CommentRequest, CommentsRequest, CreateCommentRequest, DeleteCommentRequest, UpdateCommentRequest};
pub use environment::{ClientConfig, Environment};
pub use error::ApiError;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::Request;
pub use transport::{Transport, UreqTransport};
pub use types::{Comment, CommentUpdate, NewComment};
