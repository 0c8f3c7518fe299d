//! Wall tests for straight hops between coordinates.
//!
//! A hop is blocked when it crosses a wall edge, unless a door opening lies
//! within `door_tolerance_m` of that edge. Navigable areas are walls only
//! when the hop leaves them; empty areas are walls everywhere.

use super::geometry::{polygon_centroid, segments_intersect, segments_within_tolerance};
use super::graph::GraphContext;
use crate::models::Coordinates;
use geo::Coord;

impl GraphContext<'_> {
    /// A door opening runs within tolerance of the wall edge.
    pub fn is_edge_passable(&self, edge_start: Coord<f64>, edge_end: Coord<f64>) -> bool {
        let tolerance = self.config.door_tolerance_m;
        if tolerance <= 0.0 {
            return false;
        }
        self.door_openings.iter().any(|&(door_start, door_end)| {
            segments_within_tolerance(edge_start, edge_end, door_start, door_end, tolerance)
        })
    }

    /// Whether hop `a`-`b` runs through a closed wall of area `idx`.
    fn crosses_wall(&self, idx: usize, a: Coord<f64>, b: Coord<f64>) -> bool {
        let area = self.area(idx);
        let (min, max) = (area.bounds.min(), area.bounds.max());
        if a.x.max(b.x) < min.x || a.x.min(b.x) > max.x || a.y.max(b.y) < min.y || a.y.min(b.y) > max.y
        {
            return false;
        }

        area.edges().any(|(edge_start, edge_end)| {
            segments_intersect(a, b, edge_start, edge_end)
                && !self.is_edge_passable(edge_start, edge_end)
        })
    }

    fn obstructed_by(&self, idx: usize, a: &Coordinates, b: &Coordinates) -> bool {
        if self.is_always_open(idx) {
            return false;
        }
        let area = self.area(idx);
        if area.contains(a) && area.contains(b) {
            return false;
        }
        self.crosses_wall(idx, a.to_coord(), b.to_coord())
    }

    /// Whether the straight hop leaves a navigable area through a closed wall.
    pub fn is_line_obstructed(&self, a: &Coordinates, b: &Coordinates) -> bool {
        self.navigable
            .iter()
            .any(|&idx| self.obstructed_by(idx, a, b))
    }

    /// Whether the straight hop enters or crosses an area with no nodes.
    pub fn crosses_empty_areas(&self, a: &Coordinates, b: &Coordinates) -> bool {
        let (pa, pb) = (a.to_coord(), b.to_coord());
        (0..self.features.areas.len())
            .filter(|&idx| self.is_empty_area(idx) && !self.is_always_open(idx))
            .any(|idx| {
                let blocked = self.crosses_wall(idx, pa, pb);
                if blocked {
                    tracing::trace!(
                        area = %self.area(idx).sub_group_value,
                        "Hop blocked by empty area"
                    );
                }
                blocked
            })
    }

    /// Hop is usable for entry points and graph edges alike.
    pub fn is_hop_clear(&self, a: &Coordinates, b: &Coordinates) -> bool {
        !self.is_line_obstructed(a, b) && !self.crosses_empty_areas(a, b)
    }

    /// Waypoints after `start` up to and including `end`.
    ///
    /// Inside one concave room the hop may cut through a wall; detour via
    /// the room's centroid when both halves are clear, else keep the hop.
    pub fn adjust_segment(&self, start: &Coordinates, end: &Coordinates) -> Vec<Coordinates> {
        let Some(idx) = self.navigable_area_at(start) else {
            return vec![*end];
        };
        if self.navigable_area_at(end) != Some(idx) || self.is_always_open(idx) {
            return vec![*end];
        }

        let area = self.area(idx);
        let (s, e) = (start.to_coord(), end.to_coord());
        if !self.crosses_wall(idx, s, e) {
            return vec![*end];
        }

        let Some(centroid) = polygon_centroid(&area.ring) else {
            return vec![*end];
        };
        let mid = Coordinates::from_coord(centroid);
        if !self.crosses_wall(idx, s, centroid) && !self.crosses_wall(idx, centroid, e) {
            return vec![mid, *end];
        }
        vec![*end]
    }
}
