use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.observability.service_name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
