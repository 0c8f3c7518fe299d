pub mod feature_store;
pub mod planner;

pub use feature_store::FeatureStore;
pub use planner::RoutePlanner;
