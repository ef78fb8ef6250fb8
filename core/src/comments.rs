//! Requests for the comments endpoints.
//!
//! One value per operation. Each `build` targets the environment's base URL,
//! carries the API key and declares JSON content negotiation.

use crate::environment::Environment;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::{check_status, Request};
use crate::types::{Comment, CommentUpdate, NewComment};

/// Fetch a single comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRequest {
    pub id: u64,
}

impl CommentRequest {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

impl Request for CommentRequest {
    type Response = Comment;

    fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError> {
        let url = environment.endpoint(&format!("/comments/{}", self.id), &[])?;
        Ok(HttpRequest::json(HttpMethod::Get, url))
    }
}

/// List comments, optionally paginated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentsRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CommentsRequest {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}

impl Request for CommentsRequest {
    type Response = Vec<Comment>;

    fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        let url = environment.endpoint("/comments", &query)?;
        Ok(HttpRequest::json(HttpMethod::Get, url))
    }
}

/// Post a new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentRequest {
    pub text: String,
    pub username: String,
}

impl CreateCommentRequest {
    pub fn new(text: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            username: username.into(),
        }
    }
}

impl Request for CreateCommentRequest {
    type Response = Comment;

    fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError> {
        let payload = NewComment {
            text: self.text.clone(),
            username: self.username.clone(),
        };
        let url = environment.endpoint("/comments", &[])?;
        HttpRequest::json(HttpMethod::Post, url).with_json_body(&payload)
    }
}

/// Edit an existing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommentRequest {
    pub id: u64,
    pub update: CommentUpdate,
}

impl UpdateCommentRequest {
    pub fn text(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            update: CommentUpdate {
                text: Some(text.into()),
            },
        }
    }
}

impl Request for UpdateCommentRequest {
    type Response = Comment;

    fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError> {
        let url = environment.endpoint(&format!("/comments/{}", self.id), &[])?;
        HttpRequest::json(HttpMethod::Patch, url).with_json_body(&self.update)
    }
}

/// Delete a comment. The server answers 204 with an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteCommentRequest {
    pub id: u64,
}

impl Request for DeleteCommentRequest {
    type Response = ();

    fn build(&self, environment: &Environment) -> Result<HttpRequest, ApiError> {
        let url = environment.endpoint(&format!("/comments/{}", self.id), &[])?;
        Ok(HttpRequest::json(HttpMethod::Delete, url))
    }

    fn parse(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::new("http://localhost:3000").unwrap().with_api_key("key")
    }

    #[test]
    fn comment_request_targets_comment_path() {
        let req = CommentRequest::new(1).build(&env()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.as_str(), "http://localhost:3000/comments/1?api_key=key");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn comments_request_without_paging_has_only_the_key() {
        let req = CommentsRequest::default().build(&env()).unwrap();
        assert_eq!(req.url.path(), "/comments");
        assert_eq!(req.url.query(), Some("api_key=key"));
    }

    #[test]
    fn comments_request_with_paging() {
        let req = CommentsRequest::page(2, 10).build(&env()).unwrap();
        assert_eq!(req.url.query(), Some("api_key=key&page=2&per_page=10"));
    }

    #[test]
    fn create_request_serializes_payload() {
        let req = CreateCommentRequest::new("Hi!", "ralph").build(&env()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url.path(), "/comments");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"text": "Hi!", "username": "ralph"}));
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let req = UpdateCommentRequest {
            id: 3,
            update: CommentUpdate::default(),
        }
        .build(&env())
        .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url.path(), "/comments/3");
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn parse_comment_success() {
        let comment = CommentRequest::new(1)
            .parse(HttpResponse::new(200, r#"{"id":1,"text":"Hallo","username":"ralph"}"#))
            .unwrap();
        assert_eq!(
            comment,
            Comment {
                id: 1,
                text: "Hallo".to_string(),
                username: "ralph".to_string()
            }
        );
    }

    #[test]
    fn parse_comment_not_found() {
        let err = CommentRequest::new(9).parse(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_comments_bad_json() {
        let err = CommentsRequest::default()
            .parse(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_create_accepts_201() {
        let comment = CreateCommentRequest::new("Hi!", "ralph")
            .parse(HttpResponse::new(201, r#"{"id":2,"text":"Hi!","username":"ralph"}"#))
            .unwrap();
        assert_eq!(comment.id, 2);
    }

    #[test]
    fn parse_create_wrong_status() {
        let err = CreateCommentRequest::new("Hi!", "ralph")
            .parse(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }

    #[test]
    fn parse_delete_requires_204() {
        let req = DeleteCommentRequest { id: 1 };
        assert!(req.parse(HttpResponse::new(204, "")).is_ok());
        assert!(matches!(req.parse(HttpResponse::new(404, "")), Err(ApiError::NotFound)));
        assert!(matches!(
            req.parse(HttpResponse::new(200, "")),
            Err(ApiError::Http { status: 200, .. })
        ));
    }
}
