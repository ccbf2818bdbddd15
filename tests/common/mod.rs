//! Shared helpers for integration tests.

use axum::response::Response;
use serde_json::Value;

/// Read a response body as JSON; empty bodies read as `null`.
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
