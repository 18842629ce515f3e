use parry3d_f64::bounding_volume::Aabb;
use parry3d_f64::na::{Matrix4, Point3, Unit, Vector3};

mod hexahedron;
mod polygon_clipping;
mod polygon_length;

pub use hexahedron::{
    find_cell_local_xyz, plane_cell_intersection_polygons, plane_hex_cell_intersection,
    HEX_FACES,
};
pub use polygon_clipping::{intersect_polygons, is_convex, triangulate};
pub use polygon_length::{clip_line_by_polygon, polygon_area_weighted_length};

/// Ordered sequence of coplanar points. The closing edge from the last point
/// back to the first is implicit.
pub type Polygon = Vec<Point3<f64>>;

/// Plane given by a point on the plane and a unit normal.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Returns `None` if `normal` has zero length.
    pub fn from_point_and_normal(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        Unit::try_new(normal, f64::EPSILON).map(|normal| Self { point, normal })
    }

    /// The local XY plane of an affine transform: passes through the
    /// translation, with the transformed Z axis (third column) as normal.
    pub fn from_transform(transform: &Matrix4<f64>) -> Option<Self> {
        let point = Point3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)]);
        let normal = Vector3::new(transform[(0, 2)], transform[(1, 2)], transform[(2, 2)]);
        Self::from_point_and_normal(point, normal)
    }

    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }
}

// Check if two unit vectors are parallel (same or opposite direction)
pub fn is_parallel(v1: &Vector3<f64>, v2: &Vector3<f64>, eps: f64) -> bool {
    let dot_prod = v1.dot(v2).abs();
    1. - eps < dot_prod && dot_prod < 1. + eps
}

/// Polygon area normal
///
/// Sums the cross products of a triangle fan rooted at the first vertex.
/// The length of the returned vector is the polygon area, its direction the
/// polygon normal following the right hand rule on the vertex order.
/// Polygons with fewer than 3 vertices give the zero vector.
pub fn polygon_area_normal_3d(polygon: &[Point3<f64>]) -> Vector3<f64> {
    if polygon.len() < 3 {
        return Vector3::zeros();
    }

    let root = polygon[0];
    polygon[1..]
        .windows(2)
        .map(|w| (w[0] - root).cross(&(w[1] - root)))
        .sum::<Vector3<f64>>()
        * 0.5
}

pub fn polygon_area(polygon: &[Point3<f64>]) -> f64 {
    polygon_area_normal_3d(polygon).magnitude()
}

/// Axis aligned bounding box of a point set, `None` for an empty set.
pub fn bounding_box(points: &[Point3<f64>]) -> Option<Aabb> {
    let first = points.first()?;
    let (mins, maxs) = points
        .iter()
        .skip(1)
        .fold((*first, *first), |(mins, maxs), p| (mins.inf(p), maxs.sup(p)));
    Some(Aabb::new(mins, maxs))
}

/// Largest bounding box extent of the points, used to scale tolerances.
pub(crate) fn length_scale<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> f64 {
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return 0.;
    };
    let (mins, maxs) = points.fold((*first, *first), |(mins, maxs), p| (mins.inf(p), maxs.sup(p)));
    (maxs - mins).max()
}

/// Removes consecutive points closer than `tolerance`, including the
/// closing pair formed by the last and first point.
pub(crate) fn remove_duplicate_points(polygon: Polygon, tolerance: f64) -> Polygon {
    let mut cleaned: Polygon = Vec::with_capacity(polygon.len());
    for p in polygon {
        if cleaned
            .last()
            .map_or(true, |last| (p - last).magnitude() > tolerance)
        {
            cleaned.push(p);
        }
    }

    while cleaned.len() > 1 {
        let (first, last) = (cleaned[0], cleaned[cleaned.len() - 1]);
        if (last - first).magnitude() > tolerance {
            break;
        }
        cleaned.pop();
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        vec![
            Point3::new(0., 0., 0.),
            Point3::new(1., 0., 0.),
            Point3::new(1., 1., 0.),
            Point3::new(0., 1., 0.),
        ]
    }

    #[test]
    fn area_normal_follows_winding() {
        let square = unit_square();
        let normal = polygon_area_normal_3d(&square);
        assert!((normal - Vector3::new(0., 0., 1.)).magnitude() < 1e-12);

        let reversed: Polygon = square.into_iter().rev().collect();
        let normal = polygon_area_normal_3d(&reversed);
        assert!((normal - Vector3::new(0., 0., -1.)).magnitude() < 1e-12);
    }

    #[test]
    fn area_of_tilted_triangle() {
        let triangle = vec![
            Point3::new(0., 0., 0.),
            Point3::new(2., 0., 0.),
            Point3::new(0., 0., 3.),
        ];
        assert!((polygon_area(&triangle) - 3.).abs() < 1e-12);
    }

    #[test]
    fn degenerate_polygons_have_zero_area() {
        assert_eq!(polygon_area(&[]), 0.);
        assert_eq!(
            polygon_area(&[Point3::new(0., 0., 0.), Point3::new(1., 0., 0.)]),
            0.
        );
        let collinear = vec![
            Point3::new(0., 0., 0.),
            Point3::new(1., 0., 0.),
            Point3::new(2., 0., 0.),
        ];
        assert!(polygon_area(&collinear) < 1e-15);
    }

    #[test]
    fn plane_from_transform_uses_third_column() {
        let transform = Matrix4::new_translation(&Vector3::new(1., 2., 3.));
        let plane = Plane::from_transform(&transform).unwrap();
        assert_eq!(plane.point, Point3::new(1., 2., 3.));
        assert!((plane.signed_distance(&Point3::new(5., 5., 4.)) - 1.).abs() < 1e-12);
    }

    #[test]
    fn bounding_box_of_points() {
        let aabb = bounding_box(&unit_square()).unwrap();
        assert_eq!(aabb.mins, Point3::new(0., 0., 0.));
        assert_eq!(aabb.maxs, Point3::new(1., 1., 0.));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn duplicate_points_are_removed() {
        let mut square = unit_square();
        square.insert(1, Point3::new(1e-14, 0., 0.));
        square.push(Point3::new(0., 0., 1e-14));
        let cleaned = remove_duplicate_points(square, 1e-9);
        assert_eq!(cleaned, unit_square());
    }
}
