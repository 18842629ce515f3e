use itertools::Itertools;
use parry3d_f64::na::Point3;

use super::{length_scale, remove_duplicate_points, Polygon};

/// Orientation tolerances are scaled by the squared extent of the inputs.
const RELATIVE_EPS: f64 = 1e-10;

/// Twice the signed area of `(a, b, p)` in the xy plane. Positive when `p`
/// lies to the left of the directed line `a -> b`.
fn orient(a: &Point3<f64>, b: &Point3<f64>, p: &Point3<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Twice the signed xy area of the polygon (shoelace formula, relative to
/// the first vertex).
fn signed_area_xy(polygon: &[Point3<f64>]) -> f64 {
    let Some(origin) = polygon.first() else {
        return 0.;
    };
    polygon
        .iter()
        .map(|p| (p.x - origin.x, p.y - origin.y))
        .circular_tuple_windows()
        .map(|((ax, ay), (bx, by))| ax * by - bx * ay)
        .sum()
}

fn counter_clockwise(polygon: &[Point3<f64>], signed_area: f64) -> Polygon {
    if signed_area < 0. {
        polygon.iter().rev().cloned().collect()
    } else {
        polygon.to_vec()
    }
}

/// True if the polygon has no reflex vertex in the xy plane. Collinear
/// vertices (within `eps`) are ignored.
pub fn is_convex(polygon: &[Point3<f64>], eps: f64) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut has_left_turn = false;
    let mut has_right_turn = false;
    for (a, b, c) in polygon.iter().circular_tuple_windows() {
        let turn = orient(a, b, c);
        if turn > eps {
            has_left_turn = true;
        } else if turn < -eps {
            has_right_turn = true;
        }
    }

    !(has_left_turn && has_right_turn)
}

fn point_in_triangle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    p: &Point3<f64>,
    eps: f64,
) -> bool {
    orient(a, b, p) >= -eps && orient(b, c, p) >= -eps && orient(c, a, p) >= -eps
}

/// Ear clipping triangulation of a simple counter-clockwise polygon
///
/// Collinear vertices are dropped without producing a triangle. If no ear can
/// be found (self-intersecting input) the triangles found so far are returned.
pub fn triangulate(polygon: &[Point3<f64>], eps: f64) -> Vec<Polygon> {
    let mut remaining: Vec<usize> = (0..polygon.len()).collect();
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut clipped = false;

        for k in 0..n {
            let prev = remaining[(k + n - 1) % n];
            let curr = remaining[k];
            let next = remaining[(k + 1) % n];
            let (a, b, c) = (&polygon[prev], &polygon[curr], &polygon[next]);

            let turn = orient(a, b, c);
            if turn.abs() <= eps {
                remaining.remove(k);
                clipped = true;
                break;
            }
            if turn < 0. {
                continue;
            }

            let blocked = remaining
                .iter()
                .filter(|&&q| q != prev && q != curr && q != next)
                .any(|&q| point_in_triangle(a, b, c, &polygon[q], eps));
            if blocked {
                continue;
            }

            triangles.push(vec![*a, *b, *c]);
            remaining.remove(k);
            clipped = true;
            break;
        }

        if !clipped {
            break;
        }
    }

    if remaining.len() == 3 {
        let (a, b, c) = (
            &polygon[remaining[0]],
            &polygon[remaining[1]],
            &polygon[remaining[2]],
        );
        if orient(a, b, c) > eps {
            triangles.push(vec![*a, *b, *c]);
        }
    }

    triangles
}

/// Sutherland-Hodgman clipping of `subject` by the convex counter-clockwise
/// polygon `clip`. Points on a clip edge count as inside.
fn sutherland_hodgman(subject: &[Point3<f64>], clip: &[Point3<f64>], eps: f64) -> Polygon {
    let mut output = subject.to_vec();

    for (a, b) in clip.iter().circular_tuple_windows() {
        if output.len() < 3 {
            return Vec::new();
        }

        let input = std::mem::take(&mut output);
        for (start, end) in input.iter().circular_tuple_windows() {
            let d_start = orient(a, b, start);
            let d_end = orient(a, b, end);
            let start_inside = d_start >= -eps;
            let end_inside = d_end >= -eps;

            if start_inside != end_inside {
                let t = d_start / (d_start - d_end);
                output.push(start + (end - start) * t);
            }
            if end_inside {
                output.push(*end);
            }
        }
    }

    output
}

/// Intersect two coplanar polygons
///
/// Both polygons must lie in a plane parallel to the xy plane (the fracture
/// plane in fracture-local coordinates); only x and y take part in the
/// clipping, z is interpolated along the clipped edges.
///
/// The convex input is used as the clip polygon. When neither input is convex
/// the second polygon is triangulated and every triangle clips the first one,
/// producing one piece per triangle. A non-convex subject clipped by a convex
/// polygon comes back as a single piece whose parts may be joined by
/// zero-width bridges along the clip edges; its area is still exact.
///
/// Empty, collinear or zero-area pieces are dropped, so a missing overlap
/// gives an empty vector. The result is counter-clockwise in xy.
pub fn intersect_polygons(polygon_a: &[Point3<f64>], polygon_b: &[Point3<f64>]) -> Vec<Polygon> {
    if polygon_a.len() < 3 || polygon_b.len() < 3 {
        return Vec::new();
    }

    let scale = length_scale(polygon_a.iter().chain(polygon_b.iter()));
    if scale <= 0. || !scale.is_finite() {
        return Vec::new();
    }
    let eps = RELATIVE_EPS * scale * scale;
    let point_tolerance = RELATIVE_EPS.sqrt() * scale * 1e-3;

    let area_a = signed_area_xy(polygon_a);
    let area_b = signed_area_xy(polygon_b);
    if area_a.abs() <= eps || area_b.abs() <= eps {
        return Vec::new();
    }

    let polygon_a = counter_clockwise(polygon_a, area_a);
    let polygon_b = counter_clockwise(polygon_b, area_b);

    let (subject, clips) = if is_convex(&polygon_b, eps) {
        (polygon_a, vec![polygon_b])
    } else if is_convex(&polygon_a, eps) {
        (polygon_b, vec![polygon_a])
    } else {
        let triangles = triangulate(&polygon_b, eps);
        (polygon_a, triangles)
    };

    clips
        .iter()
        .map(|clip| sutherland_hodgman(&subject, clip, eps))
        .map(|piece| remove_duplicate_points(piece, point_tolerance))
        .filter(|piece| piece.len() >= 3 && signed_area_xy(piece).abs() > eps)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::computational_geometry::polygon_area;

    fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        vec![
            Point3::new(x0, y0, 0.),
            Point3::new(x1, y0, 0.),
            Point3::new(x1, y1, 0.),
            Point3::new(x0, y1, 0.),
        ]
    }

    // L-shaped polygon covering [0,4]x[0,4] minus [2,4]x[2,4]
    fn l_shape() -> Polygon {
        vec![
            Point3::new(0., 0., 0.),
            Point3::new(4., 0., 0.),
            Point3::new(4., 2., 0.),
            Point3::new(2., 2., 0.),
            Point3::new(2., 4., 0.),
            Point3::new(0., 4., 0.),
        ]
    }

    fn total_area(pieces: &[Polygon]) -> f64 {
        pieces.iter().map(|p| polygon_area(p)).sum()
    }

    #[test]
    fn overlapping_rectangles() {
        let a = rectangle(0., 0., 2., 2.);
        let b = rectangle(1., 1., 3., 4.);
        let pieces = intersect_polygons(&a, &b);
        assert_eq!(pieces.len(), 1);
        assert!((total_area(&pieces) - 1.).abs() < 1e-12);
    }

    #[test]
    fn disjoint_rectangles_give_nothing() {
        let a = rectangle(0., 0., 1., 1.);
        let b = rectangle(2., 0., 3., 1.);
        assert!(intersect_polygons(&a, &b).is_empty());
    }

    #[test]
    fn touching_rectangles_give_nothing() {
        let a = rectangle(0., 0., 1., 1.);
        let b = rectangle(1., 0., 2., 1.);
        assert!(intersect_polygons(&a, &b).is_empty());
    }

    #[test]
    fn small_polygon_far_from_origin() {
        let a = rectangle(1e8, 1e8, 1e8 + 1e-3, 1e8 + 1e-3);
        let pieces = intersect_polygons(&a, &a);
        assert_eq!(pieces.len(), 1);
        assert!((total_area(&pieces) - 1e-6).abs() < 1e-9);
    }

    #[test]
    fn non_convex_subject_split_by_convex_clip() {
        // U shape: [0,6]x[0,4] minus the notch [2,4]x[1,4]
        let u = vec![
            Point3::new(0., 0., 0.),
            Point3::new(6., 0., 0.),
            Point3::new(6., 4., 0.),
            Point3::new(4., 4., 0.),
            Point3::new(4., 1., 0.),
            Point3::new(2., 1., 0.),
            Point3::new(2., 4., 0.),
            Point3::new(0., 4., 0.),
        ];
        // The band crosses both prongs only
        let band = rectangle(-1., 2., 7., 3.);
        let pieces = intersect_polygons(&u, &band);
        assert!(!pieces.is_empty());
        assert!((total_area(&pieces) - 4.).abs() < 1e-9);
    }

    #[test]
    fn clipping_against_itself_returns_the_polygon() {
        let a = rectangle(-1.5, 0.25, 3., 7.);
        let pieces = intersect_polygons(&a, &a);
        assert_eq!(pieces.len(), 1);
        assert!((total_area(&pieces) - polygon_area(&a)).abs() < 1e-12);

        let l = l_shape();
        let pieces = intersect_polygons(&l, &l);
        assert!((total_area(&pieces) - 12.).abs() < 1e-9);
    }

    #[test]
    fn winding_of_inputs_does_not_matter() {
        let a = rectangle(0., 0., 2., 2.);
        let b: Polygon = rectangle(1., 0., 3., 2.).into_iter().rev().collect();
        let pieces = intersect_polygons(&a, &b);
        assert!((total_area(&pieces) - 2.).abs() < 1e-12);
    }

    #[test]
    fn non_convex_subject_with_convex_clip() {
        // Clip covers the notch of the L entirely: only the two arms remain
        let clip = rectangle(1., 1., 4., 4.);
        let pieces = intersect_polygons(&l_shape(), &clip);
        assert!((total_area(&pieces) - 5.).abs() < 1e-9);
    }

    #[test]
    fn two_non_convex_polygons_split_into_pieces() {
        let a = l_shape();
        let b: Polygon = l_shape()
            .into_iter()
            .map(|p| Point3::new(4. - p.x, p.y, 0.))
            .rev()
            .collect();
        // Mirrored L: [0,4]x[0,4] minus [0,2]x[2,4]. Overlap is [0,4]x[0,2].
        let pieces = intersect_polygons(&a, &b);
        assert!(pieces.len() > 1);
        assert!((total_area(&pieces) - 8.).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_give_nothing() {
        let a = rectangle(0., 0., 1., 1.);
        let line = vec![
            Point3::new(0., 0., 0.),
            Point3::new(0.5, 0.5, 0.),
            Point3::new(1., 1., 0.),
        ];
        assert!(intersect_polygons(&a, &line).is_empty());
        assert!(intersect_polygons(&a, &a[..2]).is_empty());
        assert!(intersect_polygons(&[], &a).is_empty());
    }

    #[test]
    fn intersection_is_symmetric_in_area() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut random_rect = || {
                let x0 = rng.random_range(-5.0..5.0);
                let y0 = rng.random_range(-5.0..5.0);
                let w = rng.random_range(0.1..6.0);
                let h = rng.random_range(0.1..6.0);
                rectangle(x0, y0, x0 + w, y0 + h)
            };
            let a = random_rect();
            let b = random_rect();
            let ab = total_area(&intersect_polygons(&a, &b));
            let ba = total_area(&intersect_polygons(&b, &a));
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }

        let ab = total_area(&intersect_polygons(&l_shape(), &rectangle(1., 1., 3., 3.)));
        let ba = total_area(&intersect_polygons(&rectangle(1., 1., 3., 3.), &l_shape()));
        assert!((ab - ba).abs() < 1e-9);
        assert!((ab - 3.).abs() < 1e-9);
    }

    #[test]
    fn triangulation_preserves_area() {
        let triangles = triangulate(&l_shape(), 1e-12);
        assert_eq!(triangles.len(), 4);
        assert!((total_area(&triangles) - 12.).abs() < 1e-12);
    }

    #[test]
    fn convexity() {
        assert!(is_convex(&rectangle(0., 0., 1., 1.), 1e-12));
        assert!(!is_convex(&l_shape(), 1e-12));
    }
}
