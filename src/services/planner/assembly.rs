use super::geometry::{bearing, bearing_difference, classify_turn};
use super::graph::{GraphContext, Node, NodeId, NodeKind};
use crate::models::{
    Coordinates, Direction, Landmark, Place, Route, RouteSource, RouteStep, StepKind,
};
use geojson::{Feature, Geometry, Value};
use uuid::Uuid;

/// Turns node paths (or predefined polylines) into finished [`Route`]s for
/// one origin/destination pair.
pub struct RouteAssembler<'c, 'a> {
    ctx: &'c GraphContext<'a>,
    origin: &'c Place,
    destination: &'c Place,
}

impl<'c, 'a> RouteAssembler<'c, 'a> {
    pub fn new(ctx: &'c GraphContext<'a>, origin: &'c Place, destination: &'c Place) -> Self {
        RouteAssembler {
            ctx,
            origin,
            destination,
        }
    }

    pub fn node_step(node: &Node) -> RouteStep {
        let (kind, label) = match node.kind {
            NodeKind::Connection => {
                let label = if node.sub_group.is_empty() {
                    &node.name
                } else {
                    &node.sub_group
                };
                (StepKind::PassConnection, label.clone())
            }
            NodeKind::Door | NodeKind::DoorLineSample => (StepKind::PassDoor, node.name.clone()),
        };
        RouteStep::new(
            node.coordinates,
            kind,
            label,
            node.attributes.services.clone().unwrap_or_default(),
        )
    }

    /// Straight origin to destination, no intermediate steps.
    pub fn direct(&self) -> Route {
        let path = vec![self.origin.coordinates, self.destination.coordinates];
        self.finish(path, Vec::new(), None, RouteSource::Computed)
    }

    /// Origin, each node (with any in-room detour), destination.
    pub fn from_nodes(&self, node_path: &[NodeId]) -> Route {
        let mut path = vec![self.origin.coordinates];
        let mut steps = Vec::with_capacity(node_path.len() + 1);
        let mut previous: Option<&Node> = None;

        for &id in node_path {
            let node = &self.ctx.nodes[id];
            if let Some(&last) = path.last() {
                path.extend(self.ctx.adjust_segment(&last, &node.coordinates));
            }

            // One step per door, however many of its line samples the path visits
            let same_door_line = previous.is_some_and(|p| {
                p.kind == NodeKind::DoorLineSample
                    && node.kind == NodeKind::DoorLineSample
                    && p.feature_index == node.feature_index
            });
            if !same_door_line {
                steps.push(Self::node_step(node));
            }
            previous = Some(node);
        }

        if let Some(&last) = path.last() {
            path.extend(self.ctx.adjust_segment(&last, &self.destination.coordinates));
        }

        self.finish(path, steps, None, RouteSource::Computed)
    }

    /// Add the arrival step, landmarks, turn directions and metrics.
    pub fn finish(
        &self,
        path: Vec<Coordinates>,
        mut steps: Vec<RouteStep>,
        duration_minutes: Option<u32>,
        source: RouteSource,
    ) -> Route {
        steps.push(RouteStep::arrive(self.destination));
        self.attach_landmarks(&path, &mut steps);
        assign_directions(&path, &mut steps);

        let distance_meters = path_distance_m(&path);
        let estimated_minutes = duration_minutes.unwrap_or_else(|| {
            estimate_minutes(distance_meters, self.ctx.config.walking_meters_per_minute)
        });

        let via = steps
            .iter()
            .filter(|s| s.kind != StepKind::ArriveDestination && !s.label.is_empty())
            .map(|s| s.label.clone())
            .collect();

        Route {
            id: Uuid::new_v4(),
            geo: line_feature(&path),
            sahns: self.ctx.sahn_sequence(&path),
            path,
            steps,
            via,
            from: self.origin.name.clone(),
            to: self.destination.name.clone(),
            distance_meters,
            estimated_minutes,
            source,
        }
    }

    /// Path segment `k` annotates step `k`: the POI best aligned with the
    /// segment's heading and close to its end.
    fn attach_landmarks(&self, path: &[Coordinates], steps: &mut [RouteStep]) {
        let config = self.ctx.config;
        let pois = &self.ctx.features.pois;

        for (step, segment) in steps.iter_mut().zip(path.windows(2)) {
            let (start, end) = (&segment[0], &segment[1]);
            if start == end {
                continue;
            }
            let heading = bearing(start, end);

            let best = pois
                .iter()
                .filter_map(|poi| {
                    let diff = bearing_difference(heading, bearing(start, &poi.coordinates));
                    let distance = poi.coordinates.distance_m(end);
                    (diff <= config.landmark_bearing_deg && distance <= config.landmark_distance_m)
                        .then_some((diff, distance, poi))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

            if let Some((_, distance, poi)) = best {
                step.landmark = Some(Landmark {
                    name: poi.name.clone(),
                    distance_meters: distance.round(),
                });
            }
        }
    }
}

/// Turn between path segments `k` and `k + 1`, for every step but the arrival.
fn assign_directions(path: &[Coordinates], steps: &mut [RouteStep]) {
    for (k, step) in steps.iter_mut().enumerate() {
        step.direction = match (path.get(k), path.get(k + 1), path.get(k + 2)) {
            (Some(a), Some(b), Some(c)) if step.kind != StepKind::ArriveDestination => {
                classify_turn(bearing(a, b), bearing(b, c))
            }
            _ => Direction::Arrive,
        };
    }
}

/// Sum of haversine distances between consecutive coordinates.
pub fn path_distance_m(path: &[Coordinates]) -> f64 {
    path.windows(2).map(|w| w[0].distance_m(&w[1])).sum()
}

/// At least one minute, even for a zero-length path.
pub fn estimate_minutes(distance_m: f64, meters_per_minute: f64) -> u32 {
    ((distance_m / meters_per_minute).round() as u32).max(1)
}

fn line_feature(path: &[Coordinates]) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(
            path.iter().map(|c| c.to_position()).collect(),
        ))),
        id: None,
        properties: None,
        foreign_members: None,
    }
}
