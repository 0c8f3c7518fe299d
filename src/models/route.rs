use crate::models::{Coordinates, Gender, TransportMode};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A named endpoint of a route request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    #[serde(default)]
    pub name: String,
    pub coordinates: Coordinates,
}

impl Place {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Place {
            name: name.into(),
            coordinates,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    PassDoor,
    PassConnection,
    ArriveDestination,
}

/// Turn to take at the end of a step, relative to the heading along it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Straight,
    Left,
    Right,
    BendLeft,
    BendRight,
    Reverse,
    Arrive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub name: String,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub coordinates: Coordinates,
    pub kind: StepKind,
    /// Door name, connector area title, or destination name
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, bool>,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<Landmark>,
}

impl RouteStep {
    pub fn new(
        coordinates: Coordinates,
        kind: StepKind,
        label: impl Into<String>,
        services: BTreeMap<String, bool>,
    ) -> Self {
        RouteStep {
            coordinates,
            kind,
            label: label.into(),
            services,
            direction: Direction::Arrive,
            landmark: None,
        }
    }

    pub fn arrive(destination: &Place) -> Self {
        RouteStep::new(
            destination.coordinates,
            StepKind::ArriveDestination,
            destination.name.clone(),
            BTreeMap::new(),
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    Predefined,
    Computed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,
    /// Ordered `[lat, lng]` coordinates from origin to destination
    pub path: Vec<Coordinates>,
    /// The same path as a GeoJSON LineString feature (`[lng, lat]`)
    pub geo: geojson::Feature,
    pub steps: Vec<RouteStep>,
    /// Ordered distinct area names the path passes through
    pub sahns: Vec<String>,
    /// Labels of the doors and connectors passed, in order
    pub via: Vec<String>,
    pub from: String,
    pub to: String,
    pub distance_meters: f64,
    pub estimated_minutes: u32,
    pub source: RouteSource,
}

impl Route {
    /// Coordinates of the GeoJSON geometry, `[lng, lat]` per vertex.
    pub fn geometry_positions(&self) -> &[Vec<f64>] {
        match self.geo.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::LineString(positions)) => positions,
            _ => &[],
        }
    }

    /// Ranking key shared by predefined candidates and alternatives.
    pub fn rank_cmp(&self, other: &Route) -> std::cmp::Ordering {
        self.estimated_minutes
            .cmp(&other.estimated_minutes)
            .then_with(|| self.distance_meters.total_cmp(&other.distance_meters))
    }
}

/// Planner output: the primary route plus ranked alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedRoute {
    #[serde(flatten)]
    pub route: Route,
    pub alternatives: Vec<Route>,
}

// Request types for API endpoints

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRouteRequest {
    pub origin: Place,
    pub destination: Place,
    #[serde(default)]
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub gender: Gender,
    /// Inline feature collection; the server's loaded collection is used when absent
    #[serde(default)]
    pub features: Option<FeatureCollection>,
}

impl PlanRouteRequest {
    pub fn validate(&self) -> Result<(), String> {
        for (role, place) in [("origin", &self.origin), ("destination", &self.destination)] {
            Coordinates::new(place.coordinates.lat, place.coordinates.lng)
                .map_err(|e| format!("{} {}", role, e))?;
        }
        Ok(())
    }
}
