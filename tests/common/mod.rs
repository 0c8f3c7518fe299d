use geojson::FeatureCollection;
use sahnroute::models::{Coordinates, Place};
use serde_json::{json, Value};

pub const BASE_LAT: f64 = 36.3;
pub const BASE_LNG: f64 = 59.6;

/// Point `east_m`/`north_m` meters from the fixture origin.
#[allow(dead_code)]
pub fn offset(east_m: f64, north_m: f64) -> Coordinates {
    Coordinates {
        lat: BASE_LAT + north_m * 8.993e-6,
        lng: BASE_LNG + east_m * 1.1155e-5,
    }
}

#[allow(dead_code)]
pub fn place(name: &str, coordinates: Coordinates) -> Place {
    Place::new(name, coordinates)
}

/// Rectangular area from its south-west and north-east corners.
#[allow(dead_code)]
pub fn rect_area(name: &str, sw: Coordinates, ne: Coordinates) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Polygon", "coordinates": [[
            [sw.lng, sw.lat], [ne.lng, sw.lat], [ne.lng, ne.lat], [sw.lng, ne.lat], [sw.lng, sw.lat]
        ]]},
        "properties": { "name": name, "subGroup": name, "subGroupValue": name.to_lowercase() }
    })
}

#[allow(dead_code)]
pub fn door(name: &str, at: Coordinates) -> Value {
    door_with(name, at, json!({}))
}

/// Door with extra properties merged in (gender, services, ...).
#[allow(dead_code)]
pub fn door_with(name: &str, at: Coordinates, extra: Value) -> Value {
    let mut properties = json!({ "nodeFunction": "door", "name": name });
    if let (Some(props), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        props.extend(extra.clone());
    }
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [at.lng, at.lat] },
        "properties": properties
    })
}

#[allow(dead_code)]
pub fn poi(name: &str, at: Coordinates) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [at.lng, at.lat] },
        "properties": { "nodeFunction": "poi", "name": name }
    })
}

#[allow(dead_code)]
pub fn route_line(points: &[Coordinates], properties: Value) -> Value {
    let coordinates: Vec<[f64; 2]> = points.iter().map(|p| [p.lng, p.lat]).collect();
    json!({
        "type": "Feature",
        "geometry": { "type": "LineString", "coordinates": coordinates },
        "properties": properties
    })
}

#[allow(dead_code)]
pub fn collection(features: Vec<Value>) -> FeatureCollection {
    serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": features
    }))
    .expect("fixture is valid GeoJSON")
}

// Two rooms side by side: west room A (no nodes) and east room B holding
// the one door just inside their shared wall.

#[allow(dead_code)]
pub fn two_room_door() -> Coordinates {
    Coordinates {
        lat: 36.3001,
        lng: 59.60021,
    }
}

#[allow(dead_code)]
pub fn two_room_origin() -> Place {
    place("West Hall", Coordinates { lat: 36.30012, lng: 59.60005 })
}

#[allow(dead_code)]
pub fn two_room_destination() -> Place {
    place("East Hall", Coordinates { lat: 36.30008, lng: 59.60035 })
}

#[allow(dead_code)]
pub fn two_room_features(door_feature: Value) -> Vec<Value> {
    vec![
        rect_area(
            "A",
            Coordinates { lat: 36.3000, lng: 59.6000 },
            Coordinates { lat: 36.3002, lng: 59.6002 },
        ),
        rect_area(
            "B",
            Coordinates { lat: 36.3000, lng: 59.6002 },
            Coordinates { lat: 36.3002, lng: 59.6004 },
        ),
        door_feature,
    ]
}

#[allow(dead_code)]
pub fn two_room_building() -> FeatureCollection {
    collection(two_room_features(door("Shared Door", two_room_door())))
}
