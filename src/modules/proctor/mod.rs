use axum::{Json, Router, body::Bytes, routing::post};
use serde_json::{Value, json};
use tracing::warn;

use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/proctor/warning", post(warning))
}

/// Observability sink for proctoring events. The payload is opaque: it is
/// logged and dropped, and the endpoint acknowledges anything it receives,
/// including malformed or absent bodies.
async fn warning(body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<Value>(&body) {
        Ok(event) => warn!(%event, "proctor warning received"),
        Err(_) => warn!(bytes = body.len(), "proctor warning with non-JSON body"),
    }

    Json(json!({ "ok": true }))
}
