//! Health endpoint.
//!
//! The service reports itself `DOWN` whenever the injection decision for the
//! health request is to fail it, so routers probing `/health` see the same
//! failure rate as regular traffic. Behind the [`ErrorInjectionLayer`], an
//! injected health request is rejected before reaching this handler; when
//! `/health` is excluded from the layer, the handler takes its own decision.
//!
//! [`ErrorInjectionLayer`]: crate::injection::ErrorInjectionLayer

use crate::{app::AppState, injection::DecisionCache};
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Status,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(
    State(state): State<AppState>,
    request: Request<Body>,
) -> (StatusCode, Json<HealthReport>) {
    let cache = request
        .extensions()
        .get::<DecisionCache>()
        .cloned()
        .unwrap_or_default();

    let status = match cache.resolve(&state.resolver).await {
        Ok(false) => Status::Up,
        Ok(true) => Status::Down,
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "health check cannot decide");
            Status::Down
        }
    };

    let code = match status {
        Status::Up => StatusCode::OK,
        Status::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(HealthReport { status }))
}
