use axum::response::Json;
use serde_json::{json, Value};

/// GET /health - liveness probe
pub async fn get() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
