//! Indoor route planning over a building's GeoJSON features.
//!
//! Each call classifies the features, builds a fresh [`GraphContext`], and
//! then tries, in order: predefined routes, a direct hop inside one area,
//! and a graph search between the best entry nodes near each endpoint.

pub mod alternatives;
pub mod assembly;
pub mod features;
pub mod geometry;
pub mod graph;
pub mod neighbors;
pub mod obstruction;
pub mod predefined;
pub mod search;

use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::models::{Coordinates, Gender, Place, PlannedRoute, Route, TransportMode};
use alternatives::generate_alternatives;
use assembly::RouteAssembler;
use features::classify;
use geojson::FeatureCollection;
use graph::{GraphContext, NodeId};
use predefined::match_predefined_routes;
use search::dijkstra;
use std::collections::HashSet;
use tracing::instrument;

#[derive(Debug, Clone, Default)]
pub struct RoutePlanner {
    config: PlannerConfig,
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        RoutePlanner { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a route from `origin` to `destination`.
    ///
    /// `Ok(None)` means no route exists; errors are reserved for feature
    /// data that cannot be interpreted at all.
    #[instrument(
        skip(self, features),
        fields(
            origin = %origin.name,
            destination = %destination.name,
            features = features.features.len(),
        )
    )]
    pub fn plan_route(
        &self,
        origin: &Place,
        destination: &Place,
        features: &FeatureCollection,
        mode: TransportMode,
        gender: Gender,
    ) -> Result<Option<PlannedRoute>, PlannerError> {
        for place in [origin, destination] {
            Coordinates::new(place.coordinates.lat, place.coordinates.lng)
                .map_err(PlannerError::InvalidCoordinates)?;
        }

        let classified = classify(features, mode, gender)?;
        let ctx = GraphContext::build(&classified, &self.config);
        let assembler = RouteAssembler::new(&ctx, origin, destination);

        let predefined =
            match_predefined_routes(&ctx, &assembler, origin, destination, mode, gender);

        if let Some(direct) = direct_hop(&ctx, &assembler, origin, destination) {
            tracing::info!(
                distance_meters = direct.distance_meters,
                predefined = predefined.len(),
                "Direct route inside one area"
            );
            let mut routes = predefined.into_iter();
            let planned = match routes.next() {
                Some(route) => {
                    let mut alternatives: Vec<Route> = routes.collect();
                    alternatives.push(direct);
                    PlannedRoute {
                        route,
                        alternatives,
                    }
                }
                None => PlannedRoute {
                    route: direct,
                    alternatives: Vec::new(),
                },
            };
            return Ok(Some(planned));
        }

        let start_entries = find_unobstructed_entries(&ctx, &origin.coordinates);
        let end_entries = find_unobstructed_entries(&ctx, &destination.coordinates);
        let (Some(&start), Some(&end)) = (start_entries.first(), end_entries.first()) else {
            tracing::info!(
                start_entries = start_entries.len(),
                end_entries = end_entries.len(),
                "No unobstructed entry point"
            );
            return Ok(split_predefined(predefined));
        };

        let node_path = dijkstra(&ctx, start, end);
        if node_path.is_empty() {
            tracing::info!(start, end, "No path between entry points");
            return Ok(split_predefined(predefined));
        }
        let computed = assembler.from_nodes(&node_path);

        let has_predefined = !predefined.is_empty();
        let mut predefined = predefined.into_iter();
        let (route, predefined_alternatives): (Route, Vec<Route>) = match predefined.next() {
            Some(best) => (best, predefined.collect()),
            None => (computed, Vec::new()),
        };

        let alternatives = if predefined_alternatives.is_empty() {
            let skip_pair = (!has_predefined).then_some((start, end));
            generate_alternatives(
                &ctx,
                &assembler,
                &route,
                &start_entries,
                &end_entries,
                skip_pair,
            )
        } else {
            predefined_alternatives
        };

        tracing::info!(
            source = ?route.source,
            distance_meters = route.distance_meters,
            estimated_minutes = route.estimated_minutes,
            steps = route.steps.len(),
            alternatives = alternatives.len(),
            "Route planned"
        );

        Ok(Some(PlannedRoute {
            route,
            alternatives,
        }))
    }
}

/// Origin and destination share a navigable area and see each other.
fn direct_hop(
    ctx: &GraphContext<'_>,
    assembler: &RouteAssembler<'_, '_>,
    origin: &Place,
    destination: &Place,
) -> Option<Route> {
    let (o, d) = (&origin.coordinates, &destination.coordinates);
    let area = ctx.navigable_area_at(o)?;
    if ctx.navigable_area_at(d) != Some(area) || !ctx.is_hop_clear(o, d) {
        return None;
    }
    Some(assembler.direct())
}

/// Best predefined route as primary, the rest as alternatives.
fn split_predefined(predefined: Vec<Route>) -> Option<PlannedRoute> {
    let mut routes = predefined.into_iter();
    let route = routes.next()?;
    Some(PlannedRoute {
        route,
        alternatives: routes.collect(),
    })
}

/// Nodes reachable from `point` by a clear straight hop, nearest first.
///
/// Prefers one node per area so searches start from different rooms, then
/// pads with the nearest remaining nodes up to `entry_candidates`.
pub fn find_unobstructed_entries(ctx: &GraphContext<'_>, point: &Coordinates) -> Vec<NodeId> {
    let count = ctx.config.entry_candidates;
    let mut reachable: Vec<(NodeId, f64)> = (0..ctx.node_count())
        .filter(|&id| ctx.is_hop_clear(point, &ctx.nodes[id].coordinates))
        .map(|id| (id, point.distance_m(&ctx.nodes[id].coordinates)))
        .collect();
    reachable.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut seen_areas = HashSet::new();
    let mut entries: Vec<NodeId> = Vec::with_capacity(count);
    for &(id, _) in &reachable {
        if entries.len() >= count {
            break;
        }
        if seen_areas.insert(ctx.node_area[id]) {
            entries.push(id);
        }
    }
    for &(id, _) in &reachable {
        if entries.len() >= count {
            break;
        }
        if !entries.contains(&id) {
            entries.push(id);
        }
    }

    tracing::debug!(
        reachable = reachable.len(),
        entries = ?entries,
        "Entry points"
    );
    entries
}
