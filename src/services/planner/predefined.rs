//! Hand-drawn routes shipped in the feature collection.
//!
//! Any non-door line whose ends sit near the requested origin and
//! destination (either direction) is used as-is, with its ends pinned to
//! the exact request coordinates.

use super::assembly::RouteAssembler;
use super::graph::{GraphContext, NodeId};
use crate::models::{Coordinates, Gender, Place, Route, RouteSource, TransportMode};
use geojson::JsonObject;
use serde_json::Value as JsonValue;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Properties checked for a walking time, in priority order.
const DURATION_KEYS: [&str; 6] = [
    "estimatedTimeMinutes",
    "timeMinutes",
    "durationMinutes",
    "duration",
    "estimatedTime",
    "time",
];

static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("valid ISO duration pattern")
});
static CLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*:\s*(\d+)(?:\s*:\s*(\d+))?$").expect("valid clock pattern")
});
static FIRST_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

/// Matching predefined routes, best first (minutes, then meters).
pub fn match_predefined_routes(
    ctx: &GraphContext<'_>,
    assembler: &RouteAssembler<'_, '_>,
    origin: &Place,
    destination: &Place,
    mode: TransportMode,
    gender: Gender,
) -> Vec<Route> {
    let tolerance = ctx.config.route_match_tolerance_m;
    let mut candidates: Vec<Route> = Vec::new();

    for line in &ctx.features.route_lines {
        if !line.attributes.eligible(mode, gender) || !line.attributes.transport_mode_listed(mode)
        {
            continue;
        }
        let mut coords = line.flattened();
        if coords.len() < 2 {
            continue;
        }

        let (first, last) = (coords[0], coords[coords.len() - 1]);
        let forward = origin.coordinates.distance_m(&first) <= tolerance
            && destination.coordinates.distance_m(&last) <= tolerance;
        let reverse = origin.coordinates.distance_m(&last) <= tolerance
            && destination.coordinates.distance_m(&first) <= tolerance;

        if !forward {
            if !reverse {
                continue;
            }
            coords.reverse();
        }

        let last_idx = coords.len() - 1;
        coords[0] = origin.coordinates;
        coords[last_idx] = destination.coordinates;

        let mut used: HashSet<NodeId> = HashSet::new();
        let steps = coords[..last_idx]
            .iter()
            .filter_map(|vertex| nearest_node(ctx, vertex))
            .filter(|&id| used.insert(id))
            .map(|id| RouteAssembler::node_step(&ctx.nodes[id]))
            .collect();

        let minutes = duration_minutes(&line.properties);
        tracing::debug!(
            feature = line.feature_index,
            reversed = !forward,
            duration_minutes = ?minutes,
            "Matched predefined route"
        );
        candidates.push(assembler.finish(coords, steps, minutes, RouteSource::Predefined));
    }

    candidates.sort_by(|a, b| a.rank_cmp(b));
    candidates
}

/// Closest node within the snap tolerance.
fn nearest_node(ctx: &GraphContext<'_>, point: &Coordinates) -> Option<NodeId> {
    ctx.nodes
        .iter()
        .enumerate()
        .map(|(id, node)| (id, node.coordinates.distance_m(point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|&(_, d)| d <= ctx.config.node_snap_tolerance_m)
        .map(|(id, _)| id)
}

/// Walking time from the first duration property that parses.
pub fn duration_minutes(properties: &JsonObject) -> Option<u32> {
    DURATION_KEYS
        .iter()
        .filter_map(|key| properties.get(*key))
        .find_map(parse_minutes)
}

/// Minutes from a number, `PT#H#M#S`, `H:M:S` / `M:S`, or the first number in a string.
///
/// Durations that do not fit in a `u32` of minutes are rejected.
pub fn parse_minutes(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => n.as_f64().and_then(round_minutes),
        JsonValue::String(s) => {
            let s = s.trim();
            if let Some(captures) = ISO_DURATION_REGEX.captures(s) {
                return iso_minutes(&captures);
            }
            if let Some(captures) = CLOCK_REGEX.captures(s) {
                return clock_minutes(&captures);
            }
            FIRST_NUMBER_REGEX
                .find(s)
                .and_then(|m| m.as_str().parse().ok())
                .and_then(round_minutes)
        }
        _ => None,
    }
}

fn round_minutes(minutes: f64) -> Option<u32> {
    let rounded = minutes.round().max(0.0);
    (rounded.is_finite() && rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
}

fn capture_f64(captures: &Captures<'_>, group: usize) -> f64 {
    captures
        .get(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

fn iso_minutes(captures: &Captures<'_>) -> Option<u32> {
    // "PT" alone names no duration
    if (1..=3).all(|group| captures.get(group).is_none()) {
        return None;
    }
    round_minutes(
        capture_f64(captures, 1) * 60.0
            + capture_f64(captures, 2)
            + capture_f64(captures, 3) / 60.0,
    )
}

/// `M:S` with two fields, `H:M:S` with three.
fn clock_minutes(captures: &Captures<'_>) -> Option<u32> {
    let (hours, minutes, seconds) = if captures.get(3).is_some() {
        (
            capture_f64(captures, 1),
            capture_f64(captures, 2),
            capture_f64(captures, 3),
        )
    } else {
        (0.0, capture_f64(captures, 1), capture_f64(captures, 2))
    };
    round_minutes(hours * 60.0 + minutes + seconds / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_are_rounded_minutes() {
        assert_eq!(parse_minutes(&json!(4)), Some(4));
        assert_eq!(parse_minutes(&json!(2.6)), Some(3));
        assert_eq!(parse_minutes(&json!(null)), None);
        assert_eq!(parse_minutes(&json!(true)), None);
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_minutes(&json!("PT3M")), Some(3));
        assert_eq!(parse_minutes(&json!("PT1H5M")), Some(65));
        assert_eq!(parse_minutes(&json!("PT90S")), Some(2));
        assert_eq!(parse_minutes(&json!("pt2m30s")), Some(3));
        // not a valid ISO duration, falls through to the first number
        assert_eq!(parse_minutes(&json!("PT5M2H")), Some(5));
    }

    #[test]
    fn clock_durations() {
        assert_eq!(parse_minutes(&json!("1:02:00")), Some(62));
        assert_eq!(parse_minutes(&json!("4:30")), Some(5));
        assert_eq!(parse_minutes(&json!("4:29")), Some(4));
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert_eq!(parse_minutes(&json!("PT99999999H")), None);
        assert_eq!(parse_minutes(&json!("99999999:00:00")), None);
        assert_eq!(parse_minutes(&json!(1e12)), None);
        assert_eq!(parse_minutes(&json!("PT")), None);
        assert_eq!(parse_minutes(&json!("PT70000000M")), Some(70_000_000));
    }

    #[test]
    fn free_text_uses_first_number() {
        assert_eq!(parse_minutes(&json!("about 7.5 min")), Some(8));
        assert_eq!(parse_minutes(&json!("12 minutes")), Some(12));
        assert_eq!(parse_minutes(&json!("soon")), None);
    }

    #[test]
    fn duration_keys_have_priority() {
        let properties: JsonObject = serde_json::from_value(json!({
            "time": 9,
            "duration": "n/a",
            "durationMinutes": 6
        }))
        .unwrap();
        assert_eq!(duration_minutes(&properties), Some(6));

        let properties: JsonObject = serde_json::from_value(json!({ "time": "PT2M" })).unwrap();
        assert_eq!(duration_minutes(&properties), Some(2));
        assert_eq!(duration_minutes(&JsonObject::new()), None);
    }
}
