//! `GET /health` — liveness probe for the worker deployment.

use axum::Json;

pub async fn check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
