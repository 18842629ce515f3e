use std::collections::HashMap;
use std::ops::Range;

use itertools::iproduct;
use parry3d_f64::bounding_volume::Aabb;
use parry3d_f64::na::Point3;

use super::{GridAccessor, GridError, StaticProperty};

/// Rectilinear grid with variable column, row and layer widths
///
/// Global cell indices follow the Eclipse ordering `i + nx * (j + ny * k)`.
/// Layers are stacked along +z starting at the origin. DX, DY and DZ are
/// derived from the widths and NTG defaults to 1; permeabilities have to be
/// set before use.
#[derive(Clone, Debug)]
pub struct CartesianGrid {
    x_nodes: Vec<f64>,
    y_nodes: Vec<f64>,
    z_nodes: Vec<f64>,
    active: Vec<bool>,
    properties: HashMap<StaticProperty, Vec<f64>>,
}

fn node_coordinates(start: f64, widths: &[f64]) -> Vec<f64> {
    std::iter::once(start)
        .chain(widths.iter().scan(start, |pos, w| {
            *pos += w;
            Some(*pos)
        }))
        .collect()
}

/// Cells along one axis touching the closed interval `[min, max]`.
fn cell_range(nodes: &[f64], min: f64, max: f64) -> Range<usize> {
    let n_cells = nodes.len() - 1;
    let first = nodes[1..].partition_point(|&x| x < min);
    let end = nodes[..n_cells].partition_point(|&x| x <= max);
    first..end.max(first)
}

impl CartesianGrid {
    /// Create a grid from its corner position and the widths of every
    /// column (`dx`), row (`dy`) and layer (`dz`).
    pub fn new(origin: Point3<f64>, dx: &[f64], dy: &[f64], dz: &[f64]) -> Result<Self, GridError> {
        let valid = |widths: &[f64]| !widths.is_empty() && widths.iter().all(|&w| w > 0.);
        if !(valid(dx) && valid(dy) && valid(dz)) {
            return Err(GridError::EmptyGrid);
        }

        let (nx, ny, nz) = (dx.len(), dy.len(), dz.len());
        let cell_count = nx * ny * nz;

        // Cells in global index order
        let cells = || iproduct!(0..nz, 0..ny, 0..nx);

        let mut properties: HashMap<StaticProperty, Vec<f64>> = HashMap::new();
        properties.insert(
            StaticProperty::Dx,
            cells().map(|(_, _, i)| dx[i]).collect(),
        );
        properties.insert(
            StaticProperty::Dy,
            cells().map(|(_, j, _)| dy[j]).collect(),
        );
        properties.insert(
            StaticProperty::Dz,
            cells().map(|(k, _, _)| dz[k]).collect(),
        );
        properties.insert(StaticProperty::Ntg, vec![1.; cell_count]);

        Ok(Self {
            x_nodes: node_coordinates(origin.x, dx),
            y_nodes: node_coordinates(origin.y, dy),
            z_nodes: node_coordinates(origin.z, dz),
            active: vec![true; cell_count],
            properties,
        })
    }

    /// Number of cells in i, j and k.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (
            self.x_nodes.len() - 1,
            self.y_nodes.len() - 1,
            self.z_nodes.len() - 1,
        )
    }

    pub fn cell_count(&self) -> usize {
        self.active.len()
    }

    pub fn cell_index(&self, i: usize, j: usize, k: usize) -> usize {
        let (nx, ny, _) = self.dimensions();
        i + nx * (j + ny * k)
    }

    pub fn ijk(&self, cell_index: usize) -> (usize, usize, usize) {
        let (nx, ny, _) = self.dimensions();
        (cell_index % nx, (cell_index / nx) % ny, cell_index / (nx * ny))
    }

    /// Set a property for all cells. A single value is used for every cell.
    pub fn set_property(
        &mut self,
        property: StaticProperty,
        values: Vec<f64>,
    ) -> Result<(), GridError> {
        let cell_count = self.cell_count();
        let values = match values.len() {
            1 => vec![values[0]; cell_count],
            n if n == cell_count => values,
            n => {
                return Err(GridError::WrongValueCount {
                    name: property.to_string(),
                    expected: cell_count,
                    actual: n,
                })
            }
        };

        self.properties.insert(property, values);
        Ok(())
    }

    /// Replace the active flags of all cells (ACTNUM).
    pub fn set_active_cells(&mut self, active: Vec<bool>) -> Result<(), GridError> {
        if active.len() != self.cell_count() {
            return Err(GridError::WrongValueCount {
                name: "ACTNUM".to_string(),
                expected: self.cell_count(),
                actual: active.len(),
            });
        }
        self.active = active;
        Ok(())
    }

    pub fn set_inactive(&mut self, cell_index: usize) -> Result<(), GridError> {
        let cell_count = self.cell_count();
        let flag = self
            .active
            .get_mut(cell_index)
            .ok_or(GridError::CellOutOfRange {
                cell_index,
                cell_count,
            })?;
        *flag = false;
        Ok(())
    }

    pub fn active_cell_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }
}

impl GridAccessor for CartesianGrid {
    fn find_intersecting_cells(&self, bounding_box: &Aabb) -> Vec<usize> {
        let (mins, maxs) = (bounding_box.mins, bounding_box.maxs);
        let i_range = cell_range(&self.x_nodes, mins.x, maxs.x);
        let j_range = cell_range(&self.y_nodes, mins.y, maxs.y);
        let k_range = cell_range(&self.z_nodes, mins.z, maxs.z);

        iproduct!(k_range, j_range, i_range)
            .map(|(k, j, i)| self.cell_index(i, j, k))
            .collect()
    }

    fn is_active(&self, cell_index: usize) -> bool {
        self.active.get(cell_index).copied().unwrap_or(false)
    }

    fn cell_corner_vertices(&self, cell_index: usize) -> [Point3<f64>; 8] {
        let (i, j, k) = self.ijk(cell_index);
        let (x0, x1) = (self.x_nodes[i], self.x_nodes[i + 1]);
        let (y0, y1) = (self.y_nodes[j], self.y_nodes[j + 1]);
        let (z0, z1) = (self.z_nodes[k], self.z_nodes[k + 1]);

        [
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ]
    }

    fn scalar_property(
        &self,
        property: StaticProperty,
        cell_index: usize,
    ) -> Result<f64, GridError> {
        self.properties
            .get(&property)
            .and_then(|values| values.get(cell_index))
            .copied()
            .ok_or(GridError::MissingProperty {
                property,
                cell_index,
            })
    }
}
