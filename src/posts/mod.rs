//! Posts CRUD endpoints.
//!
//! `PATCH` behaves like `PUT`: the stored post is replaced as a whole.

use crate::{app::AppState, error::ErrorBody};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

mod repository;
pub use repository::PostRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Assigned by the server; ignored on input.
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found.")]
    NotFound(u64),
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        let status = match self {
            PostError::NotFound(id) => {
                tracing::debug!(id, "post not found");
                StatusCode::NOT_FOUND
            }
        };
        ErrorBody::new(status, "Post not found.").into_response_with(status)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(replace_post)
                .patch(replace_post)
                .delete(delete_post),
        )
}

async fn list_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.posts.list())
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, PostError> {
    state.posts.get(id).map(Json).ok_or(PostError::NotFound(id))
}

async fn create_post(State(state): State<AppState>, Json(post): Json<Post>) -> Json<Post> {
    let post = state.posts.create(post);
    tracing::info!(id = post.id, "post created");
    Json(post)
}

async fn replace_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(post): Json<Post>,
) -> Result<Json<Post>, PostError> {
    state
        .posts
        .replace(id, post)
        .map(Json)
        .ok_or(PostError::NotFound(id))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, PostError> {
    state.posts.delete(id).ok_or(PostError::NotFound(id))?;
    tracing::info!(id, "post deleted");
    Ok(StatusCode::OK)
}
