use super::features::{Area, ClassifiedFeatures, FeatureAttributes, PointFeature};
use crate::config::PlannerConfig;
use crate::constants::{ADJACENCY_VERTEX_EPSILON_DEG, CLOSEST_PAIR_COUNT, DOOR_SAMPLE_KEY_DECIMALS};
use crate::models::Coordinates;
use geo::Coord;
use std::collections::{HashMap, HashSet};

/// Index into [`GraphContext::nodes`]
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Door,
    Connection,
    /// Synthesized on a door LineString (vertex or midpoint)
    DoorLineSample,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub coordinates: Coordinates,
    pub kind: NodeKind,
    pub name: String,
    pub sub_group: String,
    pub attributes: FeatureAttributes,
    pub feature_index: usize,
}

impl Node {
    fn from_point(point: &PointFeature, kind: NodeKind) -> Self {
        Node {
            coordinates: point.coordinates,
            kind,
            name: point.attributes.name.clone(),
            sub_group: point.attributes.sub_group.clone(),
            attributes: point.attributes.clone(),
            feature_index: point.feature_index,
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind == NodeKind::Connection
    }
}

/// A stretch of wall that a door occupies. Door points give zero-length openings.
pub type DoorOpening = (Coord<f64>, Coord<f64>);

/// Everything the search needs for one request, built once and borrowed.
#[derive(Debug)]
pub struct GraphContext<'a> {
    pub features: &'a ClassifiedFeatures,
    pub config: &'a PlannerConfig,
    pub nodes: Vec<Node>,
    /// First navigable area containing each node
    pub node_area: Vec<Option<usize>>,
    /// Nodes contained in each area, by point-in-polygon against every node
    pub area_node_counts: Vec<usize>,
    /// Indices into `features.areas`, in feature order
    pub navigable: Vec<usize>,
    pub door_openings: Vec<DoorOpening>,
    always_open: Vec<bool>,
    area_has_connection: Vec<bool>,
    /// Adjacent navigable area pairs `(low, high)` and their closest node pairs
    closest_pairs: HashMap<(usize, usize), Vec<(NodeId, NodeId)>>,
}

impl<'a> GraphContext<'a> {
    pub fn build(features: &'a ClassifiedFeatures, config: &'a PlannerConfig) -> Self {
        let mut nodes: Vec<Node> = features
            .door_points
            .iter()
            .map(|door| Node::from_point(door, NodeKind::Door))
            .collect();
        nodes.extend(door_line_samples(features));
        nodes.extend(
            features
                .connections
                .iter()
                .map(|conn| Node::from_point(conn, NodeKind::Connection)),
        );

        let areas = &features.areas;
        let always_open: Vec<bool> = areas.iter().map(|a| config.is_covered_entry(&a.name)).collect();

        let mut area_node_counts = vec![0usize; areas.len()];
        let mut area_has_connection = vec![false; areas.len()];
        for node in &nodes {
            for (idx, area) in areas.iter().enumerate() {
                if area.contains(&node.coordinates) {
                    area_node_counts[idx] += 1;
                    area_has_connection[idx] |= node.is_connection();
                }
            }
        }

        let navigable: Vec<usize> = (0..areas.len())
            .filter(|&idx| always_open[idx] || area_node_counts[idx] > 0)
            .collect();

        let node_area = nodes
            .iter()
            .map(|node| {
                navigable
                    .iter()
                    .copied()
                    .find(|&idx| areas[idx].contains(&node.coordinates))
            })
            .collect();

        let mut door_openings: Vec<DoorOpening> = features
            .door_lines
            .iter()
            .flat_map(|line| line.parts.iter())
            .flat_map(|part| part.windows(2).map(|w| (w[0].to_coord(), w[1].to_coord())))
            .collect();
        door_openings.extend(features.door_points.iter().map(|door| {
            let c = door.coordinates.to_coord();
            (c, c)
        }));

        let mut ctx = GraphContext {
            features,
            config,
            nodes,
            node_area,
            area_node_counts,
            navigable,
            door_openings,
            always_open,
            area_has_connection,
            closest_pairs: HashMap::new(),
        };
        ctx.closest_pairs = ctx.compute_closest_pairs();

        tracing::debug!(
            nodes = ctx.nodes.len(),
            navigable_areas = ctx.navigable.len(),
            empty_areas = ctx.area_node_counts.iter().filter(|&&c| c == 0).count(),
            door_openings = ctx.door_openings.len(),
            adjacent_area_pairs = ctx.closest_pairs.len(),
            "Built navigation graph"
        );

        ctx
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn area(&self, idx: usize) -> &Area {
        &self.features.areas[idx]
    }

    pub fn is_always_open(&self, idx: usize) -> bool {
        self.always_open[idx]
    }

    pub fn is_empty_area(&self, idx: usize) -> bool {
        self.area_node_counts[idx] == 0
    }

    pub fn area_has_connection(&self, idx: usize) -> bool {
        self.area_has_connection[idx]
    }

    /// First navigable area containing `point`
    pub fn navigable_area_at(&self, point: &Coordinates) -> Option<usize> {
        self.navigable
            .iter()
            .copied()
            .find(|&idx| self.area(idx).contains(point))
    }

    /// Both points lie inside one navigable area.
    pub fn share_navigable_area(&self, a: &Coordinates, b: &Coordinates) -> bool {
        self.navigable.iter().any(|&idx| {
            let area = self.area(idx);
            area.contains(a) && area.contains(b)
        })
    }

    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.closest_pairs.contains_key(&area_key(a, b))
    }

    /// Whether `(i, j)` (either order) is one of the closest node pairs
    /// between the adjacent areas `a` and `b`.
    pub fn is_closest_pair(&self, a: usize, b: usize, i: NodeId, j: NodeId) -> bool {
        self.closest_pairs
            .get(&area_key(a, b))
            .is_some_and(|pairs| pairs.iter().any(|&p| p == (i, j) || p == (j, i)))
    }

    /// Ordered distinct `subGroup` names of the navigable areas along `path`.
    pub fn sahn_sequence(&self, path: &[Coordinates]) -> Vec<String> {
        let mut seq: Vec<String> = Vec::new();
        for point in path {
            let Some(idx) = self.navigable_area_at(point) else {
                continue;
            };
            let name = &self.area(idx).sub_group;
            if !name.is_empty() && seq.last() != Some(name) {
                seq.push(name.clone());
            }
        }
        seq
    }

    /// `subGroupValue`s of the navigable areas `path` touches.
    pub fn visited_areas(&self, path: &[Coordinates]) -> HashSet<String> {
        path.iter()
            .filter_map(|p| self.navigable_area_at(p))
            .map(|idx| self.area(idx).sub_group_value.clone())
            .collect()
    }

    fn compute_closest_pairs(&self) -> HashMap<(usize, usize), Vec<(NodeId, NodeId)>> {
        let areas = &self.features.areas;
        let members: HashMap<usize, Vec<NodeId>> = self
            .navigable
            .iter()
            .map(|&idx| {
                let inside = self
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| areas[idx].contains(&n.coordinates))
                    .map(|(id, _)| id)
                    .collect();
                (idx, inside)
            })
            .collect();

        let mut out = HashMap::new();
        for (pos, &a) in self.navigable.iter().enumerate() {
            for &b in &self.navigable[pos + 1..] {
                if !areas[a].is_adjacent_to(&areas[b], ADJACENCY_VERTEX_EPSILON_DEG) {
                    continue;
                }

                let mut pairs: Vec<(f64, NodeId, NodeId)> = Vec::new();
                for &i in &members[&a] {
                    for &j in &members[&b] {
                        let d = self.nodes[i]
                            .coordinates
                            .distance_m(&self.nodes[j].coordinates);
                        pairs.push((d, i, j));
                    }
                }
                pairs.sort_by(|x, y| x.0.total_cmp(&y.0));

                out.insert(
                    area_key(a, b),
                    pairs
                        .into_iter()
                        .take(CLOSEST_PAIR_COUNT)
                        .map(|(_, i, j)| (i, j))
                        .collect(),
                );
            }
        }
        out
    }
}

fn area_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Vertices and segment midpoints of every door line, first occurrence wins.
fn door_line_samples(features: &ClassifiedFeatures) -> Vec<Node> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    for line in &features.door_lines {
        for part in &line.parts {
            for (i, vertex) in part.iter().enumerate() {
                let mut samples = vec![*vertex];
                if let Some(next) = part.get(i + 1) {
                    samples.push(vertex.midpoint(next));
                }

                for sample in samples {
                    if !seen.insert(sample.key(DOOR_SAMPLE_KEY_DECIMALS)) {
                        continue;
                    }
                    nodes.push(Node {
                        coordinates: sample,
                        kind: NodeKind::DoorLineSample,
                        name: line.attributes.name.clone(),
                        sub_group: line.attributes.sub_group.clone(),
                        attributes: line.attributes.clone(),
                        feature_index: line.feature_index,
                    });
                }
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, TransportMode};
    use crate::services::planner::features::classify;
    use geojson::FeatureCollection;
    use serde_json::json;

    fn square(west: f64, south: f64, east: f64, north: f64, name: &str) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[
                [west, south], [east, south], [east, north], [west, north], [west, south]
            ]]},
            "properties": { "subGroupValue": name, "subGroup": name, "name": name }
        })
    }

    fn classified(features: serde_json::Value) -> ClassifiedFeatures {
        let fc: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": features
        }))
        .unwrap();
        classify(&fc, TransportMode::Walking, Gender::Male).unwrap()
    }

    #[test]
    fn door_lines_sample_vertices_and_midpoints() {
        let config = PlannerConfig::default();
        let features = classified(
            json!([{
                "type": "Feature",
                "geometry": { "type": "MultiLineString", "coordinates": [
                    [[59.6000, 36.3000], [59.6002, 36.3000], [59.6004, 36.3000]],
                    [[59.6004, 36.3000], [59.6006, 36.3000]]
                ]},
                "properties": { "nodeFunction": "door", "name": "Long door" }
            }]),
        );
        let ctx = GraphContext::build(&features, &config);

        // 3 vertices + 2 midpoints, then the shared vertex is deduplicated: +1 midpoint +1 vertex
        assert_eq!(ctx.node_count(), 7);
        assert!(ctx.nodes.iter().all(|n| n.kind == NodeKind::DoorLineSample));
        assert!((ctx.nodes[1].coordinates.lng - 59.6001).abs() < 1e-9);
        assert_eq!(ctx.door_openings.len(), 3);
    }

    #[test]
    fn navigability_follows_contained_nodes() {
        let mut config = PlannerConfig::default();
        config.covered_entry_names = vec!["Porch".to_string()];
        let features = classified(
            json!([
                square(59.6000, 36.3000, 59.6002, 36.3002, "A"),
                square(59.6002, 36.3000, 59.6004, 36.3002, "B"),
                square(59.6010, 36.3000, 59.6012, 36.3002, "Porch"),
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [59.6003, 36.3001] },
                  "properties": { "nodeFunction": "connection", "subGroup": "Hall" } },
            ]),
        );
        let ctx = GraphContext::build(&features, &config);

        assert_eq!(ctx.navigable, vec![1, 2]);
        assert!(ctx.is_empty_area(0));
        assert!(ctx.is_empty_area(2));
        assert!(ctx.is_always_open(2));
        assert!(ctx.area_has_connection(1));
        assert_eq!(ctx.node_area, vec![Some(1)]);
    }

    #[test]
    fn adjacent_areas_keep_two_closest_pairs() {
        let config = PlannerConfig::default();
        let door = |lng: f64, lat: f64| {
            json!({ "type": "Feature", "geometry": { "type": "Point", "coordinates": [lng, lat] },
                    "properties": { "nodeFunction": "door" } })
        };
        let features = classified(
            json!([
                square(59.6000, 36.3000, 59.6002, 36.3002, "A"),
                square(59.6002, 36.3000, 59.6004, 36.3002, "B"),
                door(59.60015, 36.3001),
                door(59.60005, 36.3001),
                door(59.60025, 36.3001),
                door(59.60035, 36.3001),
            ]),
        );
        let ctx = GraphContext::build(&features, &config);

        assert!(ctx.are_adjacent(0, 1));
        assert!(ctx.is_closest_pair(0, 1, 0, 2));
        assert!(ctx.is_closest_pair(1, 0, 2, 0));
        assert!(!ctx.is_closest_pair(0, 1, 1, 3));
        // second closest is a 2e-4 tie; the earlier pair in node order wins
        assert!(ctx.is_closest_pair(0, 1, 0, 3) || ctx.is_closest_pair(0, 1, 1, 2));
    }

    #[test]
    fn sahn_sequence_collapses_repeats() {
        let config = PlannerConfig::default();
        let features = classified(
            json!([
                square(59.6000, 36.3000, 59.6002, 36.3002, "A"),
                square(59.6002, 36.3000, 59.6004, 36.3002, "B"),
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [59.6001, 36.3001] },
                  "properties": { "nodeFunction": "door" } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [59.6003, 36.3001] },
                  "properties": { "nodeFunction": "door" } },
            ]),
        );
        let ctx = GraphContext::build(&features, &config);
        let path = [
            Coordinates { lat: 36.3001, lng: 59.60005 },
            Coordinates { lat: 36.3001, lng: 59.60015 },
            Coordinates { lat: 36.3001, lng: 59.60030 },
            Coordinates { lat: 36.3001, lng: 59.60100 },
        ];
        assert_eq!(ctx.sahn_sequence(&path), vec!["A", "B"]);
        assert_eq!(ctx.visited_areas(&path).len(), 2);
    }
}
