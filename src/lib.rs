// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, PlannerError, Result};
pub use services::{FeatureStore, RoutePlanner};

use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub planner: Arc<RoutePlanner>,
    pub feature_store: FeatureStore,
}
