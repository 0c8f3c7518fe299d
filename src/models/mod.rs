pub mod coordinates;
pub mod profile;
pub mod route;

pub use coordinates::Coordinates;
pub use profile::{Gender, TransportMode};
pub use route::{
    Direction, Landmark, PlannedRoute, Place, Route, RouteSource, RouteStep, StepKind,
};
