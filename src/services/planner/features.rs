use crate::error::PlannerError;
use crate::models::{Coordinates, Gender, TransportMode};
use geo::{BoundingRect, Coord, LineString, Rect};
use geojson::{FeatureCollection, JsonObject, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Role of a feature, from `properties.nodeFunction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFunction {
    Door,
    Connection,
    Poi,
}

impl NodeFunction {
    fn parse(properties: &JsonObject) -> Option<Self> {
        match properties.get("nodeFunction")?.as_str()?.trim() {
            "door" => Some(NodeFunction::Door),
            "connection" => Some(NodeFunction::Connection),
            "poi" => Some(NodeFunction::Poi),
            _ => None,
        }
    }
}

/// The property bag fields the planner reads, lifted out of the raw JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureAttributes {
    pub name: String,
    pub sub_group: String,
    pub services: Option<BTreeMap<String, bool>>,
    pub genders: Vec<String>,
    pub transport_modes: Vec<String>,
}

impl FeatureAttributes {
    pub fn from_properties(properties: &JsonObject) -> Self {
        FeatureAttributes {
            name: string_property(properties, "name").unwrap_or_default(),
            sub_group: string_property(properties, "subGroup").unwrap_or_default(),
            services: properties.get("services").and_then(parse_services),
            genders: properties.get("gender").map(parse_genders).unwrap_or_default(),
            transport_modes: properties
                .get("transportModes")
                .and_then(JsonValue::as_array)
                .map(|modes| {
                    modes
                        .iter()
                        .filter_map(|m| m.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Only an explicit `false` under one of the mode's service keys disables it.
    pub fn service_allowed(&self, mode: TransportMode) -> bool {
        let Some(services) = &self.services else {
            return true;
        };
        mode.service_keys()
            .iter()
            .find_map(|key| services.get(*key))
            .copied()
            .unwrap_or(true)
    }

    pub fn transport_mode_listed(&self, mode: TransportMode) -> bool {
        self.transport_modes.is_empty() || self.transport_modes.iter().any(|m| m == mode.as_str())
    }

    pub fn eligible(&self, mode: TransportMode, gender: Gender) -> bool {
        self.service_allowed(mode) && gender.admits(&self.genders)
    }
}

fn string_property(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-boolean service values are treated as enabled.
fn parse_services(value: &JsonValue) -> Option<BTreeMap<String, bool>> {
    let map = value.as_object()?;
    Some(
        map.iter()
            .map(|(k, v)| (k.clone(), v.as_bool().unwrap_or(true)))
            .collect(),
    )
}

/// `gender` may be a list, a comma separated string, or a single scalar.
fn parse_genders(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|g| g.as_str().map(str::to_string))
            .collect(),
        JsonValue::String(s) => s.split(',').map(str::to_string).collect(),
        JsonValue::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[derive(Debug, Clone)]
pub struct PointFeature {
    pub feature_index: usize,
    pub coordinates: Coordinates,
    pub attributes: FeatureAttributes,
}

#[derive(Debug, Clone)]
pub struct LineFeature {
    pub feature_index: usize,
    /// One entry per LineString part, each at least one vertex long
    pub parts: Vec<Vec<Coordinates>>,
    pub attributes: FeatureAttributes,
    pub properties: JsonObject,
}

impl LineFeature {
    /// All parts joined end to end, as a MultiLineString route is walked.
    pub fn flattened(&self) -> Vec<Coordinates> {
        self.parts.iter().flatten().copied().collect()
    }
}

#[derive(Debug, Clone)]
pub struct Poi {
    pub name: String,
    pub coordinates: Coordinates,
}

/// An area polygon (a room, courtyard, or corridor). Only the outer ring is used.
#[derive(Debug, Clone)]
pub struct Area {
    pub feature_index: usize,
    /// Closed ring in `(lng, lat)` order
    pub ring: Vec<Coord<f64>>,
    pub bounds: Rect<f64>,
    pub sub_group_value: String,
    pub sub_group: String,
    pub name: String,
}

impl Area {
    pub fn new(
        feature_index: usize,
        mut ring: Vec<Coord<f64>>,
        properties: &JsonObject,
    ) -> Option<Self> {
        if ring.len() < 3 {
            return None;
        }
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }
        let bounds = LineString::from(ring.clone()).bounding_rect()?;

        Some(Area {
            feature_index,
            ring,
            bounds,
            sub_group_value: string_property(properties, "subGroupValue").unwrap_or_default(),
            sub_group: string_property(properties, "subGroup").unwrap_or_default(),
            name: string_property(properties, "name").unwrap_or_default(),
        })
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        let p = point.to_coord();
        let (min, max) = (self.bounds.min(), self.bounds.max());
        if p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y {
            return false;
        }
        super::geometry::point_in_polygon(p, &self.ring)
    }

    /// Wall edges, in ring order
    pub fn edges(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        self.ring.windows(2).map(|w| (w[0], w[1]))
    }

    /// Rings are adjacent when some pair of their vertices nearly coincides.
    pub fn is_adjacent_to(&self, other: &Area, epsilon_deg: f64) -> bool {
        self.ring.iter().any(|a| {
            other
                .ring
                .iter()
                .any(|b| (a.x - b.x).hypot(a.y - b.y) < epsilon_deg)
        })
    }
}

/// Feature collection split by role, with mode and gender filters applied.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedFeatures {
    pub door_points: Vec<PointFeature>,
    pub door_lines: Vec<LineFeature>,
    pub connections: Vec<PointFeature>,
    pub pois: Vec<Poi>,
    pub areas: Vec<Area>,
    /// Non-door line features: candidate predefined routes (not yet filtered)
    pub route_lines: Vec<LineFeature>,
}

fn point_coordinates(
    feature_index: usize,
    position: &[f64],
) -> Result<Coordinates, PlannerError> {
    if position.len() < 2 {
        return Err(PlannerError::InvalidGeometry {
            feature: feature_index,
            reason: format!("point has {} coordinate values", position.len()),
        });
    }
    Coordinates::from_position(position).ok_or_else(|| PlannerError::InvalidGeometry {
        feature: feature_index,
        reason: "point coordinates are not finite".to_string(),
    })
}

fn line_parts(value: &Value) -> Vec<Vec<Coordinates>> {
    let raw: Vec<&Vec<Vec<f64>>> = match value {
        Value::LineString(line) => vec![line],
        Value::MultiLineString(lines) => lines.iter().collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|line| {
            line.iter()
                .filter_map(|p| Coordinates::from_position(p))
                .collect::<Vec<_>>()
        })
        .filter(|part| !part.is_empty())
        .collect()
}

/// Split a raw FeatureCollection into the planner's typed inputs.
///
/// Malformed polygons and lines are skipped; a Point feature with a
/// `nodeFunction` but unusable coordinates is rejected outright.
pub fn classify(
    collection: &FeatureCollection,
    mode: TransportMode,
    gender: Gender,
) -> Result<ClassifiedFeatures, PlannerError> {
    let mut out = ClassifiedFeatures::default();
    let empty = JsonObject::new();

    for (feature_index, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let properties = feature.properties.as_ref().unwrap_or(&empty);
        let function = NodeFunction::parse(properties);

        match &geometry.value {
            Value::Point(position) => {
                let Some(function) = function else {
                    continue;
                };
                let coordinates = point_coordinates(feature_index, position)?;
                let attributes = FeatureAttributes::from_properties(properties);

                match function {
                    NodeFunction::Poi => out.pois.push(Poi {
                        name: attributes.name,
                        coordinates,
                    }),
                    NodeFunction::Door | NodeFunction::Connection => {
                        if !attributes.eligible(mode, gender) {
                            continue;
                        }
                        let point = PointFeature {
                            feature_index,
                            coordinates,
                            attributes,
                        };
                        if function == NodeFunction::Door {
                            out.door_points.push(point);
                        } else {
                            out.connections.push(point);
                        }
                    }
                }
            }
            value @ (Value::LineString(_) | Value::MultiLineString(_)) => {
                let parts = line_parts(value);
                if parts.is_empty() {
                    tracing::debug!(feature = feature_index, "Skipping empty line feature");
                    continue;
                }
                let attributes = FeatureAttributes::from_properties(properties);
                let line = LineFeature {
                    feature_index,
                    parts,
                    attributes,
                    properties: properties.clone(),
                };

                if function == Some(NodeFunction::Door) {
                    if line.attributes.eligible(mode, gender) {
                        out.door_lines.push(line);
                    }
                } else {
                    out.route_lines.push(line);
                }
            }
            Value::Polygon(rings) => {
                let ring: Vec<Coord<f64>> = rings
                    .first()
                    .map(|outer| {
                        outer
                            .iter()
                            .filter_map(|p| Coordinates::from_position(p))
                            .map(Coordinates::to_coord)
                            .collect()
                    })
                    .unwrap_or_default();

                match Area::new(feature_index, ring, properties) {
                    Some(area) => out.areas.push(area),
                    None => {
                        tracing::debug!(feature = feature_index, "Skipping degenerate polygon")
                    }
                }
            }
            _ => {}
        }
    }

    tracing::debug!(
        door_points = out.door_points.len(),
        door_lines = out.door_lines.len(),
        connections = out.connections.len(),
        pois = out.pois.len(),
        areas = out.areas.len(),
        route_lines = out.route_lines.len(),
        mode = %mode,
        gender = %gender,
        "Classified features"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(features: JsonValue) -> FeatureCollection {
        serde_json::from_value(json!({ "type": "FeatureCollection", "features": features }))
            .unwrap()
    }

    fn point(lng: f64, lat: f64, properties: JsonValue) -> JsonValue {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lng, lat] },
            "properties": properties
        })
    }

    #[test]
    fn splits_features_by_role() {
        let fc = collection(json!([
            point(59.6, 36.3, json!({"nodeFunction": "door", "name": "Gate 1"})),
            point(59.6001, 36.3, json!({"nodeFunction": "connection", "subGroup": "Hall"})),
            point(59.6002, 36.3, json!({"nodeFunction": "poi", "name": "Fountain"})),
            point(59.6003, 36.3, json!({"name": "no role"})),
            {
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": [[59.6, 36.3], [59.6001, 36.3]] },
                "properties": { "nodeFunction": "door" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "MultiLineString", "coordinates": [[[59.6, 36.3], [59.61, 36.31]]] },
                "properties": { "duration": 4 }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[59.6, 36.3], [59.61, 36.3], [59.61, 36.31], [59.6, 36.3]]] },
                "properties": { "subGroupValue": 7, "subGroup": "Courtyard" }
            }
        ]));

        let out = classify(&fc, TransportMode::Walking, Gender::Male).unwrap();

        assert_eq!(out.door_points.len(), 1);
        assert_eq!(out.door_points[0].attributes.name, "Gate 1");
        assert_eq!(out.connections.len(), 1);
        assert_eq!(out.pois.len(), 1);
        assert_eq!(out.pois[0].name, "Fountain");
        assert_eq!(out.door_lines.len(), 1);
        assert_eq!(out.route_lines.len(), 1);
        assert_eq!(out.areas.len(), 1);
        assert_eq!(out.areas[0].sub_group_value, "7");
        assert_eq!(out.areas[0].sub_group, "Courtyard");
    }

    #[test]
    fn filters_by_gender_and_service() {
        let fc = collection(json!([
            point(59.6, 36.3, json!({"nodeFunction": "door", "gender": "female"})),
            point(59.6, 36.3, json!({"nodeFunction": "door", "gender": "male,family"})),
            point(59.6, 36.3, json!({"nodeFunction": "door", "services": {"walking": false}})),
            point(59.6, 36.3, json!({"nodeFunction": "door", "services": {"electricVan": false}})),
        ]));
        let male = classify(&fc, TransportMode::Walking, Gender::Male).unwrap();
        assert_eq!(male.door_points.len(), 2);

        let female = classify(&fc, TransportMode::Walking, Gender::Female).unwrap();
        assert_eq!(female.door_points.len(), 3);

        let family = classify(&fc, TransportMode::Walking, Gender::Family).unwrap();
        assert_eq!(family.door_points.len(), 2);

        let car = classify(&fc, TransportMode::ElectricCar, Gender::Male).unwrap();
        // the female door is excluded by gender, the electricVan door by service alias
        assert_eq!(car.door_points.len(), 2);
    }

    #[test]
    fn first_present_service_alias_decides() {
        let attributes = FeatureAttributes {
            services: Some(BTreeMap::from([
                ("electricCar".to_string(), true),
                ("electricVan".to_string(), false),
            ])),
            ..Default::default()
        };
        assert!(attributes.service_allowed(TransportMode::ElectricCar));
        assert!(attributes.service_allowed(TransportMode::Wheelchair));
    }

    #[test]
    fn short_point_fails_fast() {
        let fc = collection(json!([{
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [59.6] },
            "properties": { "nodeFunction": "door" }
        }]));
        let err = classify(&fc, TransportMode::Walking, Gender::Male).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidGeometry { feature: 0, .. }));
    }

    #[test]
    fn degenerate_geometry_is_skipped() {
        let fc = collection(json!([
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [] },
                "properties": {}
            },
            {
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": [] },
                "properties": { "nodeFunction": "door" }
            }
        ]));
        let out = classify(&fc, TransportMode::Walking, Gender::Male).unwrap();
        assert!(out.areas.is_empty());
        assert!(out.door_lines.is_empty());
    }

    #[test]
    fn area_closes_open_rings() {
        let ring = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ];
        let area = Area::new(0, ring, &JsonObject::new()).unwrap();
        assert_eq!(area.ring.len(), 4);
        assert_eq!(area.edges().count(), 3);
        assert!(area.contains(&Coordinates { lat: 0.2, lng: 0.8 }));
        assert!(!area.contains(&Coordinates { lat: 0.8, lng: 0.2 }));
    }
}
