use itertools::{Itertools, MinMaxResult};
use parry3d_f64::na::{Point3, Vector3};

/// Number of strips the polygon is split into when measuring its length.
const LENGTH_RESOLUTION: usize = 20;

/// Length of the infinite line through `origin` along the unit xy vector
/// `direction` that lies inside `polygon` (xy plane, even-odd rule).
pub fn clip_line_by_polygon(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    polygon: &[Point3<f64>],
) -> f64 {
    let across = Vector3::new(-direction.y, direction.x, 0.);

    let mut crossings: Vec<f64> = polygon
        .iter()
        .circular_tuple_windows()
        .filter_map(|(a, b)| {
            let side_a = across.dot(&(a - origin));
            let side_b = across.dot(&(b - origin));
            // Half-open test: a vertex on the line belongs to the positive side
            if (side_a > 0.) == (side_b > 0.) {
                return None;
            }
            let t = side_a / (side_a - side_b);
            let crossing = a + (b - a) * t;
            Some(direction.dot(&(crossing - origin)))
        })
        .collect();

    crossings.sort_by(f64::total_cmp);
    crossings.chunks_exact(2).map(|c| c[1] - c[0]).sum()
}

/// Polygon area weighted length
///
/// Measures the extent of `polygon` along `direction` (both in the xy plane).
/// The polygon is cut into strips parallel to `direction`; every strip gets
/// the length `L_i` of its centre line inside the polygon and an area
/// `A_i = L_i * width`. The result is `sum(L_i * A_i) / sum(A_i)`.
///
/// Degenerate input (fewer than 3 points, zero direction, zero width) gives 0.
pub fn polygon_area_weighted_length(direction: &Vector3<f64>, polygon: &[Point3<f64>]) -> f64 {
    if polygon.len() < 3 {
        return 0.;
    }

    let Some(direction) = Vector3::new(direction.x, direction.y, 0.).try_normalize(f64::EPSILON)
    else {
        return 0.;
    };
    let across = Vector3::new(-direction.y, direction.x, 0.);

    let (min, max) = match polygon.iter().map(|p| across.dot(&p.coords)).minmax() {
        MinMaxResult::MinMax(min, max) => (min, max),
        MinMaxResult::OneElement(_) | MinMaxResult::NoElements => return 0.,
    };
    let width = (max - min) / LENGTH_RESOLUTION as f64;
    if !(width > 0.) {
        return 0.;
    }

    let (length_x_area, area) = (0..LENGTH_RESOLUTION)
        .map(|k| {
            let offset = min + width * (k as f64 + 0.5);
            let origin = Point3::from(across * offset);
            let length = clip_line_by_polygon(&origin, &direction, polygon);
            (length, length * width)
        })
        .fold((0., 0.), |(lxa, a), (length, area)| {
            (lxa + length * area, a + area)
        });

    if area > 0. {
        length_x_area / area
    } else {
        0.
    }
}
