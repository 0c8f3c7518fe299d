use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised while turning a feature collection into a route.
/// "No route" is not an error; the planner returns `Ok(None)` for it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Invalid geometry in feature {feature}: {reason}")]
    InvalidGeometry { feature: usize, reason: String },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("Feature data error: {0}")]
    FeatureData(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No route found: {0}")]
    NoRoute(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Planner(ref e) => {
                tracing::warn!("Planner rejected input: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::FeatureData(ref e) => {
                tracing::error!("Feature data error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Feature data unavailable".to_string(),
                )
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::NoRoute(ref e) => {
                tracing::info!("No route found: {}", e);
                (StatusCode::NOT_FOUND, e.clone())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
