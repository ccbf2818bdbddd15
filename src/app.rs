//! Router assembly.

use crate::{
    error::ErrorBody,
    health,
    injection::{ErrorInjectionLayer, Resolver},
    posts::{self, PostRepository},
};
use axum::{http::StatusCode, response::Response, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub posts: Arc<PostRepository>,
    pub resolver: Resolver,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            posts: Arc::new(PostRepository::new()),
            resolver,
        }
    }
}

/// Build the router with every route behind the injection layer.
///
/// `excluded_paths` are path prefixes that bypass injection.
pub fn router<I, P>(state: AppState, excluded_paths: I) -> Router
where
    I: IntoIterator<Item = P>,
    P: Into<String>,
{
    let injection =
        ErrorInjectionLayer::new(state.resolver.clone()).exclude_paths(excluded_paths);

    Router::new()
        .merge(posts::routes())
        .merge(health::routes())
        .fallback(not_found)
        .with_state(state)
        .layer(injection)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> Response {
    ErrorBody::new(StatusCode::NOT_FOUND, "No matching route found")
        .into_response_with(StatusCode::NOT_FOUND)
}
