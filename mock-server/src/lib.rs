use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_PER_PAGE: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub text: String,
    pub username: String,
}

#[derive(Deserialize)]
pub struct NewComment {
    pub text: String,
    pub username: String,
}

#[derive(Deserialize)]
pub struct CommentUpdate {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct Paging {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    comments: BTreeMap<u64, Comment>,
}

pub type Db = Arc<RwLock<Store>>;

/// Router for the comments API. Every route requires `api_key=<api_key>`
/// in the query string.
pub fn app(api_key: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api_key: Arc<str> = Arc::from(api_key);
    Router::new()
        .route("/comments", get(list_comments).post(create_comment))
        .route(
            "/comments/{id}",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(api_key, require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_api_key(
    State(api_key): State<Arc<str>>,
    Query(params): Query<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match params.get("api_key") {
        Some(key) if key.as_str() == &*api_key => Ok(next.run(request).await),
        _ => {
            log::warn!("rejected {} {}: missing or wrong api_key", request.method(), request.uri().path());
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn list_comments(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Vec<Comment>> {
    let store = db.read().await;
    let per_page = paging.per_page.unwrap_or(DEFAULT_PER_PAGE);
    let page = paging.page.unwrap_or(1).max(1);
    Json(
        store
            .comments
            .values()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect(),
    )
}

async fn create_comment(
    State(db): State<Db>,
    Json(input): Json<NewComment>,
) -> (StatusCode, Json<Comment>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let comment = Comment {
        id: store.next_id,
        text: input.text,
        username: input.username,
    };
    store.comments.insert(comment.id, comment.clone());
    log::info!("created comment {} by {}", comment.id, comment.username);
    (StatusCode::CREATED, Json(comment))
}

async fn get_comment(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Comment>, StatusCode> {
    let store = db.read().await;
    store.comments.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_comment(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<CommentUpdate>,
) -> Result<Json<Comment>, StatusCode> {
    let mut store = db.write().await;
    let comment = store.comments.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(text) = input.text {
        comment.text = text;
    }
    Ok(Json(comment.clone()))
}

async fn delete_comment(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .comments
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
