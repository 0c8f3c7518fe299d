pub mod debug;
pub mod plan_route;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/routes/plan", post(plan_route::plan_route))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
