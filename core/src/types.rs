//! Domain DTOs for the comments API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// A single comment returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub text: String,
    pub username: String,
}

/// Request payload for creating a comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
    pub username: String,
}

/// Request payload for editing a comment. Omitted fields are left unchanged
/// on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
