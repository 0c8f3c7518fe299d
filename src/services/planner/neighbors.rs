use super::graph::{GraphContext, NodeId};

/// Which rule admitted an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeReason {
    ConnectionPriority,
    SamePolygon,
    CrossPolygonPenalized,
    ClosestDoorPair,
    CrossPolygonDefault,
    UnobstructedSamePolygon,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    /// Walking cost: haversine meters times the rule's multiplier
    pub weight: f64,
    pub reason: EdgeReason,
}

impl GraphContext<'_> {
    /// Apply the edge rules to `(i, j)`; the first rule that matches decides.
    pub fn classify_edge(&self, i: NodeId, j: NodeId) -> Option<Edge> {
        if i == j {
            return None;
        }
        let config = self.config;
        let (a, b) = (&self.nodes[i], &self.nodes[j]);
        let distance = a.coordinates.distance_m(&b.coordinates);
        let within_cap = distance <= config.cross_polygon_cap_m;
        let (area_i, area_j) = (self.node_area[i], self.node_area[j]);
        let edge = |weight: f64, reason| {
            Some(Edge {
                to: j,
                weight,
                reason,
            })
        };

        // No rule may skip through an area without nodes
        if self.crosses_empty_areas(&a.coordinates, &b.coordinates) {
            return None;
        }

        if (a.is_connection() || b.is_connection()) && within_cap {
            return edge(
                distance * config.connection_weight,
                EdgeReason::ConnectionPriority,
            );
        }

        let same_area = area_i.is_some() && area_i == area_j;
        if same_area {
            return edge(distance, EdgeReason::SamePolygon);
        }

        if within_cap {
            if let (Some(pa), Some(pb)) = (area_i, area_j) {
                if self.area_has_connection(pa) || self.area_has_connection(pb) {
                    return edge(
                        distance * config.penalized_weight,
                        EdgeReason::CrossPolygonPenalized,
                    );
                }
                if self.are_adjacent(pa, pb) && self.is_closest_pair(pa, pb, i, j) {
                    return edge(
                        distance * config.closest_pair_weight,
                        EdgeReason::ClosestDoorPair,
                    );
                }
            }
            return edge(
                distance * config.cross_polygon_weight,
                EdgeReason::CrossPolygonDefault,
            );
        }

        // Overlapping areas: both inside one navigable area that is not the first match.
        if self.share_navigable_area(&a.coordinates, &b.coordinates)
            && !self.is_line_obstructed(&a.coordinates, &b.coordinates)
        {
            return edge(distance, EdgeReason::UnobstructedSamePolygon);
        }

        None
    }

    /// Every node reachable from `i` in one hop, in node order.
    pub fn valid_neighbors(&self, i: NodeId) -> Vec<Edge> {
        (0..self.node_count())
            .filter_map(|j| self.classify_edge(i, j))
            .collect()
    }
}
