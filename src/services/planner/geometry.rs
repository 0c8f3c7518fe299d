use crate::constants::EARTH_RADIUS_METERS;
use crate::models::{Coordinates, Direction};
use geo::Coord;

/// Cross products below this magnitude count as collinear
const COLLINEAR_EPSILON: f64 = 1e-10;

/// Even-odd ray casting test. `ring` is in planar `(lng, lat)` order.
pub fn point_in_polygon(point: Coord<f64>, ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if (yi > point.y) != (yj > point.y)
            && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: Coord<f64>, q: Coord<f64>, r: Coord<f64>) -> Orientation {
    let val = (q.x - p.x) * (r.y - q.y) - (q.y - p.y) * (r.x - q.x);
    if val.abs() < COLLINEAR_EPSILON {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// `q` lies within the bounding box of `p`-`r` (caller checked collinearity)
fn on_segment(p: Coord<f64>, q: Coord<f64>, r: Coord<f64>) -> bool {
    q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y) && q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x)
}

/// Whether segment `p1`-`p2` intersects or touches segment `p3`-`p4`.
pub fn segments_intersect(p1: Coord<f64>, p2: Coord<f64>, p3: Coord<f64>, p4: Coord<f64>) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p3, p2))
        || (o2 == Orientation::Collinear && on_segment(p1, p4, p2))
        || (o3 == Orientation::Collinear && on_segment(p3, p1, p4))
        || (o4 == Orientation::Collinear && on_segment(p3, p2, p4))
}

/// Equirectangular projection around `ref_lat`, in meters.
/// Only meaningful for tolerance checks over a few hundred meters.
pub fn project_to_meters_local(point: Coord<f64>, ref_lat: f64) -> Coord<f64> {
    Coord {
        x: EARTH_RADIUS_METERS * point.x.to_radians() * ref_lat.to_radians().cos(),
        y: EARTH_RADIUS_METERS * point.y.to_radians(),
    }
}

/// Distance from `point` to segment `start`-`end`, all in projected meters.
pub fn point_to_segment_distance(point: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let v = end - start;
    let w = point - start;

    let c1 = v.x * w.x + v.y * w.y;
    if c1 <= 0.0 {
        return (point.x - start.x).hypot(point.y - start.y);
    }

    let c2 = v.x * v.x + v.y * v.y;
    if c2 <= c1 {
        return (point.x - end.x).hypot(point.y - end.y);
    }

    let b = c1 / c2;
    let projected = start + v * b;
    (point.x - projected.x).hypot(point.y - projected.y)
}

/// Whether two `(lng, lat)` segments intersect or come within `tolerance_m`
/// of each other at any endpoint.
pub fn segments_within_tolerance(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
    tolerance_m: f64,
) -> bool {
    if segments_intersect(a1, a2, b1, b2) {
        return true;
    }

    let ref_lat = (a1.y + a2.y + b1.y + b2.y) / 4.0;
    let [a1, a2, b1, b2] = [a1, a2, b1, b2].map(|c| project_to_meters_local(c, ref_lat));

    [
        point_to_segment_distance(a1, b1, b2),
        point_to_segment_distance(a2, b1, b2),
        point_to_segment_distance(b1, a1, a2),
        point_to_segment_distance(b2, a1, a2),
    ]
    .into_iter()
    .any(|d| d <= tolerance_m)
}

/// Area centroid of a ring (shoelace). Degenerate rings fall back to their first vertex.
pub fn polygon_centroid(ring: &[Coord<f64>]) -> Option<Coord<f64>> {
    let first = *ring.first()?;
    let n = ring.len();

    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        let (x0, y0) = (ring[j].x, ring[j].y);
        let (x1, y1) = (ring[i].x, ring[i].y);
        let a = x0 * y1 - x1 * y0;
        area += a;
        cx += (x0 + x1) * a;
        cy += (y0 + y1) * a;
        j = i;
    }
    area *= 0.5;

    if area.abs() < 1e-12 {
        return Some(first);
    }
    Some(Coord {
        x: cx / (6.0 * area),
        y: cy / (6.0 * area),
    })
}

/// Initial great-circle bearing in degrees, `[0, 360)`.
pub fn bearing(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Absolute difference between two bearings, `[0, 180]`.
pub fn bearing_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Classify the turn from heading `b1` onto heading `b2`.
/// A positive signed difference is a left turn.
pub fn classify_turn(b1: f64, b2: f64) -> Direction {
    let diff = ((b1 - b2 + 540.0) % 360.0) - 180.0;
    let magnitude = diff.abs();

    if magnitude < 30.0 {
        Direction::Straight
    } else if magnitude > 150.0 {
        Direction::Reverse
    } else if magnitude < 100.0 {
        if diff > 0.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if diff > 0.0 {
        Direction::BendLeft
    } else {
        Direction::BendRight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn square() -> Vec<Coord<f64>> {
        vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)]
    }

    #[test]
    fn point_in_square() {
        let ring = square();
        assert!(point_in_polygon(c(0.5, 0.5), &ring));
        assert!(!point_in_polygon(c(1.5, 0.5), &ring));
        assert!(!point_in_polygon(c(0.5, -0.1), &ring));
    }

    #[test]
    fn point_in_concave_polygon() {
        // U shape: the notch between the arms is outside
        let ring = vec![
            c(0.0, 0.0),
            c(3.0, 0.0),
            c(3.0, 3.0),
            c(2.0, 3.0),
            c(2.0, 1.0),
            c(1.0, 1.0),
            c(1.0, 3.0),
            c(0.0, 3.0),
            c(0.0, 0.0),
        ];
        assert!(point_in_polygon(c(0.5, 2.5), &ring));
        assert!(point_in_polygon(c(2.5, 2.5), &ring));
        assert!(!point_in_polygon(c(1.5, 2.5), &ring));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        assert!(!point_in_polygon(c(0.0, 0.0), &[c(0.0, 0.0), c(1.0, 1.0)]));
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(c(0.0, 0.0), c(2.0, 2.0), c(0.0, 2.0), c(2.0, 0.0)));
        assert!(!segments_intersect(c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)));
    }

    #[test]
    fn touching_and_collinear_segments_intersect() {
        // T junction at an endpoint
        assert!(segments_intersect(c(0.0, 0.0), c(1.0, 0.0), c(1.0, -1.0), c(1.0, 1.0)));
        // Overlapping collinear
        assert!(segments_intersect(c(0.0, 0.0), c(2.0, 0.0), c(1.0, 0.0), c(3.0, 0.0)));
        // Disjoint collinear
        assert!(!segments_intersect(c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0)));
    }

    #[test]
    fn point_to_segment_distances() {
        let d = point_to_segment_distance(c(5.0, 3.0), c(0.0, 0.0), c(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-12);
        let before = point_to_segment_distance(c(-3.0, 4.0), c(0.0, 0.0), c(10.0, 0.0));
        assert!((before - 5.0).abs() < 1e-12);
        let after = point_to_segment_distance(c(13.0, 4.0), c(0.0, 0.0), c(10.0, 0.0));
        assert!((after - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_segment_distance_is_finite() {
        let d = point_to_segment_distance(c(3.0, 4.0), c(0.0, 0.0), c(0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-12);
        let same = point_to_segment_distance(c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0));
        assert_eq!(same, 0.0);
    }

    #[test]
    fn projection_scales_longitude_by_latitude() {
        let at_equator = project_to_meters_local(c(0.001, 0.0), 0.0);
        let at_sixty = project_to_meters_local(c(0.001, 0.0), 60.0);
        assert!((at_sixty.x - at_equator.x / 2.0).abs() < 1e-6);
    }

    #[test]
    fn tolerance_detects_nearby_parallel_segments() {
        // ~1.1 m apart in latitude
        let wall = (c(59.6, 36.3), c(59.6002, 36.3));
        let door = (c(59.6, 36.30001), c(59.6002, 36.30001));
        assert!(segments_within_tolerance(wall.0, wall.1, door.0, door.1, 4.0));
        assert!(!segments_within_tolerance(wall.0, wall.1, door.0, door.1, 0.5));
    }

    #[test]
    fn centroid_of_square_and_degenerate_ring() {
        let centroid = polygon_centroid(&square()).unwrap();
        assert!((centroid.x - 0.5).abs() < 1e-12);
        assert!((centroid.y - 0.5).abs() < 1e-12);

        let flat = vec![c(2.0, 2.0), c(3.0, 2.0), c(4.0, 2.0)];
        assert_eq!(polygon_centroid(&flat), Some(c(2.0, 2.0)));
        assert_eq!(polygon_centroid(&[]), None);
    }

    #[test]
    fn bearings_follow_compass() {
        let origin = Coordinates { lat: 36.3, lng: 59.6 };
        let north = Coordinates { lat: 36.31, lng: 59.6 };
        let east = Coordinates { lat: 36.3, lng: 59.61 };
        assert!(bearing(&origin, &north).abs() < 1e-9);
        assert!((bearing(&origin, &east) - 90.0).abs() < 0.1);
        assert!((bearing_difference(350.0, 10.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn turn_classification_bands() {
        assert_eq!(classify_turn(0.0, 10.0), Direction::Straight);
        // Heading north, then west: a left turn
        assert_eq!(classify_turn(0.0, 270.0), Direction::Left);
        assert_eq!(classify_turn(0.0, 90.0), Direction::Right);
        assert_eq!(classify_turn(0.0, 235.0), Direction::BendLeft);
        assert_eq!(classify_turn(0.0, 125.0), Direction::BendRight);
        assert_eq!(classify_turn(0.0, 180.0), Direction::Reverse);
    }
}
