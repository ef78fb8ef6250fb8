//! Test helpers for code built on `comments-core`.
//!
//! # Overview
//! - `assertions`: inspect a built `HttpRequest` (method, URL, headers,
//!   query, payload) without executing it.
//! - `fixtures`: load `<name>.json` response bodies; a missing or broken
//!   fixture fails the test.
//! - `stubs`: `StubTransport`, a `Transport` that answers registered
//!   requests with canned responses and never reaches the network.
//!
//! # Design
//! Interception is an explicit value injected into the `Client`, not process
//! state, so tests using their own `StubTransport` can run in parallel.

pub mod assertions;
pub mod fixtures;
pub mod stubs;

pub use assertions::{assert_request, Mismatch, RequestAssert};
pub use fixtures::{FixtureError, Fixtures};
pub use stubs::{Stub, StubScope, StubTransport};
