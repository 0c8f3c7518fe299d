//! Stable application-wide constants.
//!
//! Values here are structural invariants and default fallbacks for
//! env-var-based configuration. The routing heuristics below are empirically
//! tuned; changing any of them changes which routes are produced and needs
//! new test fixtures. Runtime overrides live in
//! [`PlannerConfig`](crate::config::PlannerConfig).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Geodesy ---

/// Mean Earth radius used by every haversine and local projection.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// --- Edge weighting ---

/// Maximum straight-line hop (meters) between nodes in different areas,
/// and between a connection node and anything else.
pub const DEFAULT_CROSS_POLYGON_CAP_METERS: f64 = 40.0;
/// Weight multiplier for hops touching a connection node.
pub const DEFAULT_CONNECTION_WEIGHT: f64 = 1.0;
/// Weight multiplier for crossing between areas that a connector already bridges.
pub const DEFAULT_PENALIZED_WEIGHT: f64 = 2.0;
/// Weight multiplier for an ordinary cross-area hop.
pub const DEFAULT_CROSS_POLYGON_WEIGHT: f64 = 1.2;
/// Weight multiplier for one of the two closest node pairs between adjacent areas.
pub const DEFAULT_CLOSEST_PAIR_WEIGHT: f64 = 0.8;
/// Number of closest node pairs between two adjacent areas that get the bonus.
pub const CLOSEST_PAIR_COUNT: usize = 2;
/// Two rings are adjacent when any pair of their vertices is closer than this (degrees).
pub const ADJACENCY_VERTEX_EPSILON_DEG: f64 = 0.00001;

// --- Tolerances (meters) ---

/// A wall edge within this distance of a door opening lets segments through.
pub const DEFAULT_DOOR_TOLERANCE_METERS: f64 = 4.0;
/// Endpoint distance for matching a predefined route to origin/destination.
pub const DEFAULT_ROUTE_MATCH_TOLERANCE_METERS: f64 = 30.0;
/// Snap distance between a predefined route vertex and a graph node.
pub const DEFAULT_NODE_SNAP_TOLERANCE_METERS: f64 = 20.0;
/// Maximum distance between a POI and the end of a segment to be its landmark.
pub const DEFAULT_LANDMARK_DISTANCE_METERS: f64 = 30.0;
/// Maximum bearing difference (degrees) between a segment and a landmark POI.
pub const DEFAULT_LANDMARK_BEARING_DEGREES: f64 = 20.0;

// --- Alternatives ---

/// Entry nodes considered around origin and destination.
pub const DEFAULT_ENTRY_CANDIDATES: usize = 3;
/// Minimum number of path coordinates an alternative must not share with the main route.
pub const DEFAULT_MIN_NOVEL_NODES: usize = 4;
/// Decimal places used when comparing path coordinates for novelty.
pub const NOVELTY_KEY_DECIMALS: u32 = 6;
/// Per-coordinate tolerance (degrees) for two geometries to count as identical.
pub const IDENTICAL_GEOMETRY_EPSILON_DEG: f64 = 1e-6;

// --- Graph construction ---

/// Decimal places of the `lat:lng` key deduplicating door-line samples.
pub const DOOR_SAMPLE_KEY_DECIMALS: usize = 8;

// --- Metrics ---

/// Meters walked per estimated minute.
pub const DEFAULT_WALKING_METERS_PER_MINUTE: f64 = 60.0;

/// Localized names of the covered entrance, which is never treated as a wall.
pub const DEFAULT_COVERED_ENTRY_NAMES: [&str; 4] = [
    "ورودی مسقف",
    "Covered Entrance",
    "مدخل مسقوف",
    "ڈھکا ہوا داخلہ",
];
