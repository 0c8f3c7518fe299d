use crate::error::{AppError, Result};
use crate::models::route::PlanRouteRequest;
use crate::models::PlannedRoute;
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /routes/plan
/// Plan a route between two places over the request's features, or the
/// server's loaded building when the request carries none.
pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRouteRequest>,
) -> Result<Json<PlannedRoute>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        origin = %request.origin.name,
        destination = %request.destination.name,
        mode = %request.transport_mode,
        gender = %request.gender,
        inline_features = request.features.is_some(),
        "Route plan request"
    );

    let PlanRouteRequest {
        origin,
        destination,
        transport_mode,
        gender,
        features,
    } = request;

    let features = match features {
        Some(inline) => Arc::new(inline),
        None => state.feature_store.collection(),
    };
    if features.features.is_empty() {
        return Err(AppError::NoRoute("no features loaded".to_string()));
    }

    // Planning is CPU-bound; keep it off the async workers
    let planner = Arc::clone(&state.planner);
    let planned = tokio::task::spawn_blocking(move || {
        planner.plan_route(&origin, &destination, &features, transport_mode, gender)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Planner task failed: {}", e)))??;

    planned
        .map(Json)
        .ok_or_else(|| AppError::NoRoute("no walkable route between origin and destination".to_string()))
}
