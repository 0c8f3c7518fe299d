use axum::Router;
use sahnroute::config::Config;
use sahnroute::{AppState, FeatureStore, RoutePlanner};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sahnroute=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting sahnroute API server");

    let feature_store = match config.features_path {
        Some(ref path) => FeatureStore::load(path)?,
        None => {
            tracing::warn!("FEATURES_PATH not set; requests must carry their own features");
            FeatureStore::empty()
        }
    };

    let state = Arc::new(AppState {
        planner: Arc::new(RoutePlanner::new(config.planner.clone())),
        feature_store,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", sahnroute::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
