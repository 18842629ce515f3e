use parry3d_f64::na::Point3;

use super::FractureError;
use crate::computational_geometry::{bounding_box, polygon_area, Polygon};

/// Fracture cells with lower conductivity are outside the propped fracture.
pub const CONDUCTIVITY_EPS: f64 = 1e-7;

/// One cell of a fracture template
///
/// The polygon lies in the template plane (z = 0): x along the fracture,
/// y up, with the well at the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct FractureCell {
    polygon: Polygon,
    conductivity: f64,
    i: usize,
    j: usize,
}

impl FractureCell {
    pub fn new(polygon: Polygon, conductivity: f64) -> Result<Self, FractureError> {
        Self::with_index(polygon, conductivity, 0, 0)
    }

    /// Create a cell at column `i` and row `j` of its template grid.
    pub fn with_index(
        polygon: Polygon,
        conductivity: f64,
        i: usize,
        j: usize,
    ) -> Result<Self, FractureError> {
        if polygon.len() < 3 {
            return Err(FractureError::TooFewPolygonPoints(polygon.len()));
        }

        Ok(Self {
            polygon,
            conductivity,
            i,
            j,
        })
    }

    pub fn polygon(&self) -> &[Point3<f64>] {
        &self.polygon
    }

    pub fn conductivity(&self) -> f64 {
        self.conductivity
    }

    /// Column and row in the template grid.
    pub fn index(&self) -> (usize, usize) {
        (self.i, self.j)
    }

    /// False for cells outside the propped part of the fracture.
    pub fn is_open(&self) -> bool {
        self.conductivity >= CONDUCTIVITY_EPS
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.polygon)
    }

    /// Horizontal extent of the cell.
    pub fn cell_size_x(&self) -> f64 {
        bounding_box(&self.polygon).map_or(0., |b| b.maxs.x - b.mins.x)
    }

    /// Vertical extent of the cell.
    pub fn cell_size_z(&self) -> f64 {
        bounding_box(&self.polygon).map_or(0., |b| b.maxs.y - b.mins.y)
    }
}
