use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// GeoJSON FeatureCollection served when a request carries no inline features
    pub features_path: Option<String>,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum hop (meters) across areas or from a connection node
    pub cross_polygon_cap_m: f64,

    /// Multiplier for hops touching a connection node
    pub connection_weight: f64,

    /// Multiplier for skipping a connector that bridges the two areas
    pub penalized_weight: f64,

    /// Multiplier for a plain cross-area hop
    pub cross_polygon_weight: f64,

    /// Multiplier for the closest node pairs between adjacent areas
    pub closest_pair_weight: f64,

    /// Wall edges within this distance (meters) of a door opening are passable
    pub door_tolerance_m: f64,

    /// Endpoint tolerance (meters) for predefined route matching
    pub route_match_tolerance_m: f64,

    /// Vertex-to-node snap tolerance (meters) for predefined routes
    pub node_snap_tolerance_m: f64,

    /// Landmark POIs must lie within this distance (meters) of the segment end
    pub landmark_distance_m: f64,

    /// Landmark POIs must lie within this bearing (degrees) of the segment
    pub landmark_bearing_deg: f64,

    /// Entry nodes considered around origin and destination
    pub entry_candidates: usize,

    /// Minimum novel path coordinates for an alternative to be kept
    pub min_novel_nodes: usize,

    /// Meters per estimated minute
    pub walking_meters_per_minute: f64,

    /// Area names that are never treated as walls
    pub covered_entry_names: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cross_polygon_cap_m: DEFAULT_CROSS_POLYGON_CAP_METERS,
            connection_weight: DEFAULT_CONNECTION_WEIGHT,
            penalized_weight: DEFAULT_PENALIZED_WEIGHT,
            cross_polygon_weight: DEFAULT_CROSS_POLYGON_WEIGHT,
            closest_pair_weight: DEFAULT_CLOSEST_PAIR_WEIGHT,
            door_tolerance_m: DEFAULT_DOOR_TOLERANCE_METERS,
            route_match_tolerance_m: DEFAULT_ROUTE_MATCH_TOLERANCE_METERS,
            node_snap_tolerance_m: DEFAULT_NODE_SNAP_TOLERANCE_METERS,
            landmark_distance_m: DEFAULT_LANDMARK_DISTANCE_METERS,
            landmark_bearing_deg: DEFAULT_LANDMARK_BEARING_DEGREES,
            entry_candidates: DEFAULT_ENTRY_CANDIDATES,
            min_novel_nodes: DEFAULT_MIN_NOVEL_NODES,
            walking_meters_per_minute: DEFAULT_WALKING_METERS_PER_MINUTE,
            covered_entry_names: DEFAULT_COVERED_ENTRY_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            cross_polygon_cap_m: env::var("PLANNER_CROSS_POLYGON_CAP_M")
                .unwrap_or_else(|_| defaults.cross_polygon_cap_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_CROSS_POLYGON_CAP_M")?,

            connection_weight: env::var("PLANNER_CONNECTION_WEIGHT")
                .unwrap_or_else(|_| defaults.connection_weight.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_CONNECTION_WEIGHT")?,

            penalized_weight: env::var("PLANNER_PENALIZED_WEIGHT")
                .unwrap_or_else(|_| defaults.penalized_weight.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_PENALIZED_WEIGHT")?,

            cross_polygon_weight: env::var("PLANNER_DEFAULT_CROSS_WEIGHT")
                .unwrap_or_else(|_| defaults.cross_polygon_weight.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_DEFAULT_CROSS_WEIGHT")?,

            closest_pair_weight: env::var("PLANNER_CLOSEST_PAIR_WEIGHT")
                .unwrap_or_else(|_| defaults.closest_pair_weight.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_CLOSEST_PAIR_WEIGHT")?,

            door_tolerance_m: env::var("PLANNER_DOOR_TOLERANCE_M")
                .unwrap_or_else(|_| defaults.door_tolerance_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_DOOR_TOLERANCE_M")?,

            route_match_tolerance_m: env::var("PLANNER_ROUTE_MATCH_TOLERANCE_M")
                .unwrap_or_else(|_| defaults.route_match_tolerance_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_ROUTE_MATCH_TOLERANCE_M")?,

            node_snap_tolerance_m: env::var("PLANNER_NODE_SNAP_TOLERANCE_M")
                .unwrap_or_else(|_| defaults.node_snap_tolerance_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_NODE_SNAP_TOLERANCE_M")?,

            landmark_distance_m: env::var("PLANNER_LANDMARK_DISTANCE_M")
                .unwrap_or_else(|_| defaults.landmark_distance_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_LANDMARK_DISTANCE_M")?,

            landmark_bearing_deg: env::var("PLANNER_LANDMARK_BEARING_DEG")
                .unwrap_or_else(|_| defaults.landmark_bearing_deg.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_LANDMARK_BEARING_DEG")?,

            entry_candidates: env::var("PLANNER_ENTRY_CANDIDATES")
                .unwrap_or_else(|_| defaults.entry_candidates.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_ENTRY_CANDIDATES")?,

            min_novel_nodes: env::var("PLANNER_MIN_NOVEL_NODES")
                .unwrap_or_else(|_| defaults.min_novel_nodes.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_MIN_NOVEL_NODES")?,

            walking_meters_per_minute: env::var("PLANNER_WALKING_METERS_PER_MINUTE")
                .unwrap_or_else(|_| defaults.walking_meters_per_minute.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_WALKING_METERS_PER_MINUTE")?,

            covered_entry_names: match env::var("COVERED_ENTRY_NAMES") {
                Ok(raw) => raw
                    .split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect(),
                Err(_) => defaults.covered_entry_names,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("PLANNER_CROSS_POLYGON_CAP_M", self.cross_polygon_cap_m),
            ("PLANNER_CONNECTION_WEIGHT", self.connection_weight),
            ("PLANNER_PENALIZED_WEIGHT", self.penalized_weight),
            ("PLANNER_DEFAULT_CROSS_WEIGHT", self.cross_polygon_weight),
            ("PLANNER_CLOSEST_PAIR_WEIGHT", self.closest_pair_weight),
            ("PLANNER_WALKING_METERS_PER_MINUTE", self.walking_meters_per_minute),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be a positive number", name));
            }
        }

        let non_negative = [
            ("PLANNER_DOOR_TOLERANCE_M", self.door_tolerance_m),
            ("PLANNER_ROUTE_MATCH_TOLERANCE_M", self.route_match_tolerance_m),
            ("PLANNER_NODE_SNAP_TOLERANCE_M", self.node_snap_tolerance_m),
            ("PLANNER_LANDMARK_DISTANCE_M", self.landmark_distance_m),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{} must not be negative", name));
            }
        }

        if !(0.0..=180.0).contains(&self.landmark_bearing_deg) {
            return Err("PLANNER_LANDMARK_BEARING_DEG must be between 0 and 180".to_string());
        }
        if self.entry_candidates == 0 {
            return Err("PLANNER_ENTRY_CANDIDATES must be at least 1".to_string());
        }

        Ok(())
    }

    /// Smallest edge multiplier; scales the A* heuristic so it never overestimates.
    pub fn min_weight_multiplier(&self) -> f64 {
        [
            1.0,
            self.connection_weight,
            self.penalized_weight,
            self.cross_polygon_weight,
            self.closest_pair_weight,
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }

    pub fn is_covered_entry(&self, name: &str) -> bool {
        !name.is_empty() && self.covered_entry_names.iter().any(|n| n == name)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            features_path: env::var("FEATURES_PATH").ok().filter(|p| !p.is_empty()),
            planner: PlannerConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cross_polygon_cap_m, 40.0);
        assert_eq!(config.min_weight_multiplier(), 0.8);
        assert!(config.is_covered_entry("Covered Entrance"));
        assert!(!config.is_covered_entry(""));
    }

    #[test]
    #[serial]
    fn planner_config_reads_overrides() {
        env::set_var("PLANNER_CROSS_POLYGON_CAP_M", "55.5");
        env::set_var("COVERED_ENTRY_NAMES", "Porch, Lobby");
        let config = PlannerConfig::from_env().unwrap();
        env::remove_var("PLANNER_CROSS_POLYGON_CAP_M");
        env::remove_var("COVERED_ENTRY_NAMES");

        assert_eq!(config.cross_polygon_cap_m, 55.5);
        assert_eq!(config.covered_entry_names, vec!["Porch", "Lobby"]);
    }

    #[test]
    #[serial]
    fn planner_config_rejects_garbage() {
        env::set_var("PLANNER_PENALIZED_WEIGHT", "heavy");
        let result = PlannerConfig::from_env();
        env::remove_var("PLANNER_PENALIZED_WEIGHT");
        assert!(result.is_err());

        env::set_var("PLANNER_ENTRY_CANDIDATES", "0");
        let result = PlannerConfig::from_env();
        env::remove_var("PLANNER_ENTRY_CANDIDATES");
        assert!(result.is_err());
    }
}
