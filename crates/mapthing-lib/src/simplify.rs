//! Vertex reduction of lines and polygon rings
//!
//! Two passes are available:
//!
//! - **Global**: topology-preserving Visvalingam-Whyatt over a whole record geometry. The
//!   simplified polygons stay valid and non-self-intersecting. Applied first, as a coarse
//!   pass.
//! - **Local**: Douglas-Peucker on each extracted chain or hole-free ring. Applied after the
//!   global pass, as a fine pass.
//!
//! A tolerance that is not strictly positive disables a pass.

use crate::Geometry;
use geo::{LineString, Polygon, Simplify, SimplifyVwPreserve};

/// Douglas-Peucker reduction of a chain
///
/// Vertices are kept only where they lie further than `epsilon` from the chord of their
/// sub-chain. Chains shorter than three vertices and non-positive tolerances pass through
/// unchanged. The result depends only on vertex order and `epsilon`.
pub fn simplify_local(line: &LineString<f64>, epsilon: f64) -> LineString<f64> {
    if !(epsilon > 0.0) || line.0.len() < 3 {
        return line.clone();
    }
    line.simplify(epsilon)
}

/// Exterior ring of a polygon, locally simplified
///
/// Interior rings cannot be drawn as a single outline, so they are dropped. When `debug` is
/// set the dropped holes are reported.
pub fn polygon_outline(polygon: &Polygon<f64>, epsilon: f64, debug: bool) -> LineString<f64> {
    let holes = polygon.interiors().len();
    if holes > 0 {
        if debug {
            tracing::debug!("Polygon has {holes} holes; only the exterior ring is kept");
        }
        return simplify_local(polygon.exterior(), epsilon);
    }

    if !(epsilon > 0.0) {
        return polygon.exterior().clone();
    }
    polygon.simplify(epsilon).exterior().clone()
}

/// Topology-preserving reduction of a whole geometry
///
/// Points pass through. Lines and polygons are reduced with Visvalingam-Whyatt, keeping
/// rings valid. `epsilon` is an area threshold in squared source units.
pub fn simplify_global(geometry: &Geometry, epsilon: f64) -> Geometry {
    if !(epsilon > 0.0) {
        return geometry.clone();
    }

    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => geometry.clone(),
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify_vw_preserve(epsilon)),
        Geometry::MultiLineString(mls) => {
            Geometry::MultiLineString(mls.simplify_vw_preserve(epsilon))
        }
        Geometry::Polygon(p) => Geometry::Polygon(p.simplify_vw_preserve(epsilon)),
        Geometry::MultiPolygon(mp) => {
            Geometry::MultiPolygon(mp.simplify_vw_preserve(epsilon))
        }
        Geometry::Collection(geometries) => Geometry::Collection(
            geometries
                .iter()
                .map(|g| simplify_global(g, epsilon))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, line_string, polygon};

    fn zigzag(n: usize) -> LineString<f64> {
        (0..n)
            .map(|i| Coord {
                x: i as f64,
                y: if i % 2 == 0 { 0.0 } else { 0.3 + (i as f64) * 0.05 },
            })
            .collect()
    }

    #[test]
    fn test_zero_tolerance_is_identity() {
        // Collinear points would be dropped by any positive tolerance
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 3.0, y: 1.0),
        ];
        assert_eq!(simplify_local(&line, 0.0), line);
        assert_eq!(simplify_local(&zigzag(50), 0.0), zigzag(50));
    }

    #[test]
    fn test_negative_tolerance_is_identity() {
        assert_eq!(simplify_local(&zigzag(20), -1.0), zigzag(20));
        assert_eq!(simplify_local(&zigzag(20), f64::NAN), zigzag(20));
    }

    #[test]
    fn test_short_chains_pass_through() {
        let empty: LineString<f64> = LineString::new(Vec::new());
        assert_eq!(simplify_local(&empty, 1.0), empty);

        let single = line_string![(x: 1.0, y: 1.0)];
        assert_eq!(simplify_local(&single, 1.0), single);

        let pair = line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0)];
        assert_eq!(simplify_local(&pair, 1.0), pair);
    }

    #[test]
    fn test_local_drops_noise_within_tolerance() {
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.01),
            (x: 2.0, y: -0.01),
            (x: 3.0, y: 0.0),
            (x: 4.0, y: 0.02),
            (x: 5.0, y: 0.0),
        ];
        let simplified = simplify_local(&line, 0.1);
        assert_eq!(simplified, line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0)]);
    }

    #[test]
    fn test_local_keeps_spikes_and_endpoints() {
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.01),
            (x: 3.0, y: 5.0),
            (x: 4.0, y: 0.0),
        ];
        let simplified = simplify_local(&line, 0.1);
        assert!(simplified.0.contains(&Coord { x: 3.0, y: 5.0 }));
        assert_eq!(simplified.0.first(), Some(&Coord { x: 0.0, y: 0.0 }));
        assert_eq!(simplified.0.last(), Some(&Coord { x: 4.0, y: 0.0 }));
    }

    #[test]
    fn test_increasing_tolerance_never_adds_vertices() {
        let line = zigzag(200);
        let mut previous = line.0.len();
        for epsilon in [0.0, 0.01, 0.1, 0.3, 0.5, 1.0, 5.0, 50.0] {
            let count = simplify_local(&line, epsilon).0.len();
            assert!(
                count <= previous,
                "epsilon {epsilon} produced {count} vertices, previous {previous}"
            );
            previous = count;
        }
        assert_eq!(previous, 2);
    }

    #[test]
    fn test_polygon_outline_drops_holes() {
        let polygon = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
            ],
            interiors: [
                [
                    (x: 4.0, y: 4.0),
                    (x: 6.0, y: 4.0),
                    (x: 6.0, y: 6.0),
                ],
            ],
        );
        let outline = polygon_outline(&polygon, 0.0, true);
        assert_eq!(&outline, polygon.exterior());
    }

    #[test]
    fn test_polygon_outline_simplifies_ring() {
        let polygon = polygon![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.01),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let outline = polygon_outline(&polygon, 0.1, false);
        assert!(outline.0.len() < polygon.exterior().0.len());
        assert_eq!(outline.0.first(), outline.0.last());
    }

    #[test]
    fn test_global_preserves_points_and_reduces_lines() {
        let point = Geometry::Point(geo::Point::new(1.0, 2.0));
        assert_eq!(simplify_global(&point, 10.0), point);

        let line = Geometry::LineString(zigzag(100));
        let Geometry::LineString(simplified) = simplify_global(&line, 10.0) else {
            panic!("global simplification changed the geometry kind");
        };
        assert!(simplified.0.len() < 100);
        assert_eq!(simplified.0.first(), Some(&Coord { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn test_global_keeps_polygon_closed() {
        let ring: Vec<Coord<f64>> = (0..64)
            .map(|i| {
                let angle = i as f64 / 64.0 * std::f64::consts::TAU;
                let radius = if i % 2 == 0 { 10.0 } else { 9.9 };
                Coord {
                    x: radius * angle.cos(),
                    y: radius * angle.sin(),
                }
            })
            .collect();
        let polygon = Geometry::Polygon(Polygon::new(LineString::from(ring), Vec::new()));

        let Geometry::Polygon(simplified) = simplify_global(&polygon, 1.0) else {
            panic!("global simplification changed the geometry kind");
        };
        let exterior = simplified.exterior();
        assert!(exterior.0.len() >= 4);
        assert!(exterior.0.len() < 65);
        assert!(exterior.is_closed());
    }

    #[test]
    fn test_global_zero_tolerance_is_identity() {
        let line = Geometry::LineString(zigzag(10));
        assert_eq!(simplify_global(&line, 0.0), line);
    }
}
