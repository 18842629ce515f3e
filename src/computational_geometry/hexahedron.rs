//! Hexahedral grid cells
//!
//! Corner ordering follows the structured grid convention: corners 0-3 form
//! the -K face and corners 4-7 the +K face, both walking
//! `(-I,-J) -> (+I,-J) -> (+I,+J) -> (-I,+J)`.

use parry3d_f64::na::{Matrix4, Point3, Vector3};
use tracing::trace;

use super::{length_scale, remove_duplicate_points, Plane, Polygon};

/// Corner indices of the faces, in the order -I, +I, -J, +J, -K, +K.
/// Each face is oriented with its normal pointing out of the cell.
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 4, 7, 3],
    [1, 2, 6, 5],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 3, 2, 1],
    [4, 5, 6, 7],
];

const NEG_I: usize = 0;
const POS_I: usize = 1;
const NEG_J: usize = 2;
const POS_J: usize = 3;

/// Corner distances within this fraction of the cell size count as on the plane.
const RELATIVE_PLANE_TOLERANCE: f64 = 1e-10;

fn face_center(hex_corners: &[Point3<f64>; 8], face: usize) -> Point3<f64> {
    let sum = HEX_FACES[face]
        .iter()
        .map(|&c| hex_corners[c].coords)
        .sum::<Vector3<f64>>();
    Point3::from(sum * 0.25)
}

/// Find the cell local coordinate system
///
/// The I and J vectors join opposite face centres. Local Z is normal to both,
/// local X and Y are the I and J vectors made orthogonal to Z and skewed
/// symmetrically against each other.
///
/// # Returns
///
/// * `(local_x, local_y, local_z)` - unit vectors, zero for a collapsed cell
pub fn find_cell_local_xyz(
    hex_corners: &[Point3<f64>; 8],
) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let center_vector_i = face_center(hex_corners, POS_I) - face_center(hex_corners, NEG_I);
    let center_vector_j = face_center(hex_corners, POS_J) - face_center(hex_corners, NEG_J);

    let normalized = |v: Vector3<f64>| v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);

    let local_z = normalized(center_vector_i.cross(&center_vector_j));
    let local_x = normalized(center_vector_i + center_vector_j.cross(&local_z));
    let local_y = normalized(center_vector_j - center_vector_i.cross(&local_z));

    (local_x, local_y, local_z)
}

/// Plane and hexahedron intersection
///
/// Slices the cell by `plane` and returns the closed cross-section polygon(s).
/// Corners within tolerance of the plane count as lying on its positive side,
/// so a plane coinciding with a cell face cuts only the cell on the negative
/// side of the plane (the side the normal points away from). A plane on an
/// outer grid face with its normal pointing into the grid cuts no cell.
///
/// # Returns
///
/// * `None` - the plane does not cross the cell (all corners on one side)
/// * `Some(polygons)` - cross-section polygons, possibly empty for a cell that
///   is only touched in a point or along an edge
pub fn plane_hex_cell_intersection(
    hex_corners: &[Point3<f64>; 8],
    plane: &Plane,
) -> Option<Vec<Polygon>> {
    let tolerance = RELATIVE_PLANE_TOLERANCE * length_scale(hex_corners.iter());
    let distances: [f64; 8] = std::array::from_fn(|c| plane.signed_distance(&hex_corners[c]));
    let positive = distances.map(|d| d >= -tolerance);

    if positive.iter().all(|&p| p) || positive.iter().all(|&p| !p) {
        return None;
    }

    // Edges crossed by the plane, keyed by their (low, high) corner indices so
    // that both faces sharing an edge refer to the same crossing point
    let crossing_point = |(a, b): (usize, usize)| -> Point3<f64> {
        let t = (distances[a] / (distances[a] - distances[b])).clamp(0., 1.);
        hex_corners[a] + (hex_corners[b] - hex_corners[a]) * t
    };

    let mut segments: Vec<((usize, usize), (usize, usize))> = Vec::with_capacity(6);
    for face in HEX_FACES.iter() {
        let crossed: Vec<(usize, usize)> = (0..4)
            .map(|k| (face[k], face[(k + 1) % 4]))
            .filter(|&(a, b)| positive[a] != positive[b])
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();

        // Crossings come in pairs walking around the face
        for pair in crossed.chunks_exact(2) {
            segments.push((pair[0], pair[1]));
        }
    }

    let mut polygons = Vec::new();
    while let Some((start, mut current)) = segments.pop() {
        let mut edge_loop = vec![start];
        while current != start {
            edge_loop.push(current);
            let Some(pos) = segments
                .iter()
                .position(|&(a, b)| a == current || b == current)
            else {
                trace!("Open cross-section chain at edge {:?}", current);
                break;
            };
            let (a, b) = segments.swap_remove(pos);
            current = if a == current { b } else { a };
        }

        let polygon = remove_duplicate_points(
            edge_loop.into_iter().map(crossing_point).collect(),
            tolerance,
        );
        if polygon.len() >= 3 {
            polygons.push(polygon);
        }
    }

    Some(polygons)
}

/// Intersect the XY plane of `transform` with a hexahedral cell.
///
/// See [`plane_hex_cell_intersection`]. A transform with a zero third column
/// defines no plane and gives `None`.
pub fn plane_cell_intersection_polygons(
    hex_corners: &[Point3<f64>; 8],
    transform: &Matrix4<f64>,
) -> Option<Vec<Polygon>> {
    let plane = Plane::from_transform(transform)?;
    plane_hex_cell_intersection(hex_corners, &plane)
}
