use super::assembly::RouteAssembler;
use super::graph::{GraphContext, NodeId};
use super::search::astar;
use crate::constants::{IDENTICAL_GEOMETRY_EPSILON_DEG, NOVELTY_KEY_DECIMALS};
use crate::models::Route;
use rayon::prelude::*;
use std::collections::HashSet;

/// Alternative routes between every pair of entry points.
///
/// `skip_pair` is the pair the main route was computed from, if that route
/// is the one being compared against. Pair searches run in parallel; the
/// results are filtered in pair order.
pub fn generate_alternatives(
    ctx: &GraphContext<'_>,
    assembler: &RouteAssembler<'_, '_>,
    main: &Route,
    start_entries: &[NodeId],
    end_entries: &[NodeId],
    skip_pair: Option<(NodeId, NodeId)>,
) -> Vec<Route> {
    let pairs: Vec<(NodeId, NodeId)> = start_entries
        .iter()
        .flat_map(|&s| end_entries.iter().map(move |&e| (s, e)))
        .filter(|&pair| Some(pair) != skip_pair)
        .collect();

    let candidates: Vec<Route> = pairs
        .par_iter()
        .filter_map(|&(start, end)| {
            let node_path = astar(ctx, start, end);
            (!node_path.is_empty()).then(|| assembler.from_nodes(&node_path))
        })
        .collect();

    let mut kept = select_diverse(ctx, main, &candidates, true);
    if kept.is_empty() {
        kept = select_diverse(ctx, main, &candidates, false);
    }
    kept.sort_by(|a, b| a.rank_cmp(b));

    tracing::debug!(
        pairs = pairs.len(),
        candidates = candidates.len(),
        kept = kept.len(),
        "Generated alternatives"
    );
    kept
}

fn select_diverse(
    ctx: &GraphContext<'_>,
    main: &Route,
    candidates: &[Route],
    require_new_area: bool,
) -> Vec<Route> {
    let decimals = NOVELTY_KEY_DECIMALS as usize;
    let main_keys: HashSet<String> = main.path.iter().map(|c| c.key(decimals)).collect();
    let main_areas = ctx.visited_areas(&main.path);
    let check_areas = require_new_area && !ctx.navigable.is_empty();

    let mut kept: Vec<Route> = Vec::new();
    for route in candidates {
        if check_areas
            && ctx
                .visited_areas(&route.path)
                .is_subset(&main_areas)
        {
            continue;
        }
        if same_geometry(route, main) || kept.iter().any(|k| same_geometry(k, route)) {
            continue;
        }

        let novel: HashSet<String> = route
            .path
            .iter()
            .map(|c| c.key(decimals))
            .filter(|key| !main_keys.contains(key))
            .collect();
        if novel.len() < ctx.config.min_novel_nodes {
            continue;
        }
        kept.push(route.clone());
    }
    kept
}

fn same_geometry(a: &Route, b: &Route) -> bool {
    let (pa, pb) = (a.geometry_positions(), b.geometry_positions());
    pa.len() == pb.len()
        && pa.iter().zip(pb).all(|(x, y)| {
            x.len() >= 2
                && y.len() >= 2
                && (x[0] - y[0]).abs() <= IDENTICAL_GEOMETRY_EPSILON_DEG
                && (x[1] - y[1]).abs() <= IDENTICAL_GEOMETRY_EPSILON_DEG
        })
}
