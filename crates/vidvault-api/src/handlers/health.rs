use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Deliberately does not touch the database or storage.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
