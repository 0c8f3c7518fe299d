use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Report whether building data is loaded
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let feature_count = state.feature_store.len();

    Json(json!({
        "status": "ok",
        "checks": {
            "features": if feature_count > 0 { json!("ok") } else { json!("empty") },
            "feature_count": feature_count,
            "entry_candidates": state.planner.config().entry_candidates,
        }
    }))
}
