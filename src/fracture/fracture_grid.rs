use parry3d_f64::na::Point3;
use tracing::debug;

use super::{FractureCell, FractureError};
use crate::transmissibility::{
    center_to_center_transmissibility, linear_transmissibility_to_well,
    radial_transmissibility_to_well, FractureHalfCell, Perforation,
};

/// Flow connection between two neighbouring cells inside the fracture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractureConnection {
    /// Index of the first cell in [`FractureGrid::cells`]
    pub from: usize,
    /// Index of the second cell in [`FractureGrid::cells`]
    pub to: usize,
    pub transmissibility: f64,
}

/// How the well cell of a fracture drains into the well.
#[derive(Clone, Copy, Debug)]
pub enum WellConnection {
    /// Radial inflow into a well crossing the fracture
    Radial { well_radius: f64, skin_factor: f64 },
    /// Linear inflow into a perforated interval along the fracture
    Linear {
        perforation: Perforation,
        skin_factor: f64,
    },
}

/// Rectangular fracture template grid (StimPlan grid)
///
/// Cells are stored row by row, starting with the shallowest row. In the
/// template plane x runs along the fracture and y points up, with the well
/// at the origin: a cell between depths `d0 < d1` spans
/// `y = well_depth - d1 .. well_depth - d0`.
#[derive(Clone, Debug)]
pub struct FractureGrid {
    x_coords: Vec<f64>,
    depth_coords: Vec<f64>,
    well_depth: f64,
    cells: Vec<FractureCell>,
}

fn check_coordinates(coords: &[f64], name: &'static str) -> Result<(), FractureError> {
    if coords.len() < 2 {
        return Err(FractureError::TooFewCoordinates(name));
    }
    if coords.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(FractureError::UnsortedCoordinates(name));
    }
    Ok(())
}

impl FractureGrid {
    /// Build the template grid
    ///
    /// # Arguments
    ///
    /// * `x_coords` - Node x coordinates along the fracture, increasing
    /// * `depth_coords` - Node depths, increasing
    /// * `well_depth` - Depth of the well where it crosses the fracture
    /// * `conductivities` - One value per cell, row by row from the top
    pub fn new(
        x_coords: Vec<f64>,
        depth_coords: Vec<f64>,
        well_depth: f64,
        conductivities: &[f64],
    ) -> Result<Self, FractureError> {
        check_coordinates(&x_coords, "x")?;
        check_coordinates(&depth_coords, "depth")?;

        let nx = x_coords.len() - 1;
        let nz = depth_coords.len() - 1;
        if conductivities.len() != nx * nz {
            return Err(FractureError::WrongConductivityCount {
                expected: nx * nz,
                actual: conductivities.len(),
            });
        }

        let mut cells = Vec::with_capacity(nx * nz);
        for j in 0..nz {
            let top = well_depth - depth_coords[j];
            let bottom = well_depth - depth_coords[j + 1];
            for i in 0..nx {
                let (left, right) = (x_coords[i], x_coords[i + 1]);
                let polygon = vec![
                    Point3::new(left, bottom, 0.),
                    Point3::new(right, bottom, 0.),
                    Point3::new(right, top, 0.),
                    Point3::new(left, top, 0.),
                ];
                cells.push(FractureCell::with_index(
                    polygon,
                    conductivities[j * nx + i],
                    i,
                    j,
                )?);
            }
        }

        debug!("Fracture grid with {} x {} cells", nx, nz);

        Ok(Self {
            x_coords,
            depth_coords,
            well_depth,
            cells,
        })
    }

    /// Number of columns and rows.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x_coords.len() - 1, self.depth_coords.len() - 1)
    }

    pub fn cells(&self) -> &[FractureCell] {
        &self.cells
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<&FractureCell> {
        let (nx, nz) = self.dimensions();
        if i < nx && j < nz {
            self.cells.get(j * nx + i)
        } else {
            None
        }
    }

    /// Cell containing the well, `None` if the well misses the template.
    pub fn well_cell(&self) -> Option<&FractureCell> {
        let (nx, nz) = self.dimensions();
        let i = self.x_coords[1..].partition_point(|&x| x < 0.);
        let j = self.depth_coords[1..].partition_point(|&d| d < self.well_depth);
        let inside = self.x_coords[0] <= 0. && self.depth_coords[0] <= self.well_depth;
        (inside && i < nx && j < nz)
            .then(|| self.cell(i, j))
            .flatten()
    }

    /// Transmissibility from the well cell into the well, `None` if the well
    /// misses the template or its cell is closed.
    pub fn well_transmissibility(&self, connection: &WellConnection, c_darcy: f64) -> Option<f64> {
        let cell = self.well_cell().filter(|c| c.is_open())?;
        let (sx, sz) = (cell.cell_size_x(), cell.cell_size_z());

        let transmissibility = match *connection {
            WellConnection::Radial {
                well_radius,
                skin_factor,
            } => radial_transmissibility_to_well(
                cell.conductivity(),
                sx,
                sz,
                well_radius,
                skin_factor,
                c_darcy,
            ),
            WellConnection::Linear {
                perforation,
                skin_factor,
            } => linear_transmissibility_to_well(
                cell.conductivity(),
                sx,
                sz,
                &perforation,
                skin_factor,
                c_darcy,
            ),
        };
        Some(transmissibility)
    }

    /// Centre to centre connections between open neighbouring cells.
    pub fn internal_connections(&self, c_darcy: f64) -> Vec<FractureConnection> {
        let (nx, nz) = self.dimensions();
        let half_cell = |cell: &FractureCell, along_x: bool| FractureHalfCell {
            conductivity: cell.conductivity(),
            side_length_parallel: if along_x {
                cell.cell_size_x()
            } else {
                cell.cell_size_z()
            },
            side_length_normal: if along_x {
                cell.cell_size_z()
            } else {
                cell.cell_size_x()
            },
        };

        let mut connections = Vec::new();
        for j in 0..nz {
            for i in 0..nx {
                let from = j * nx + i;
                let neighbours = [(i + 1 < nx, from + 1, true), (j + 1 < nz, from + nx, false)];
                for (exists, to, along_x) in neighbours {
                    if !exists {
                        continue;
                    }
                    let (a, b) = (&self.cells[from], &self.cells[to]);
                    if !a.is_open() || !b.is_open() {
                        continue;
                    }
                    let transmissibility = center_to_center_transmissibility(
                        &half_cell(a, along_x),
                        &half_cell(b, along_x),
                        c_darcy,
                    );
                    connections.push(FractureConnection {
                        from,
                        to,
                        transmissibility,
                    });
                }
            }
        }

        connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> FractureGrid {
        // 2 x 3 cells, bottom row closed
        FractureGrid::new(
            vec![-10., 0., 10.],
            vec![100., 102., 104., 106.],
            103.,
            &[1., 2., 3., 4., 0., 0.],
        )
        .unwrap()
    }

    #[test]
    fn cells_are_placed_around_the_well() {
        let grid = grid();
        assert_eq!(grid.dimensions(), (2, 3));
        let cell = grid.cell(1, 0).unwrap();
        assert_eq!(cell.conductivity(), 2.);
        assert_eq!(cell.polygon()[0], Point3::new(0., 1., 0.));
        assert_eq!(cell.polygon()[2], Point3::new(10., 3., 0.));
        assert!(grid.cell(2, 0).is_none());
    }

    #[test]
    fn well_cell_lookup() {
        let grid = grid();
        assert_eq!(grid.well_cell().unwrap().index(), (0, 1));

        let shallow = FractureGrid::new(vec![1., 2.], vec![0., 1.], 0.5, &[1.]).unwrap();
        assert!(shallow.well_cell().is_none());
    }

    #[test]
    fn internal_connections_skip_closed_cells() {
        let grid = grid();
        let connections = grid.internal_connections(1.);
        // Horizontal: row 0 and row 1. Vertical: column 0 and 1 between rows 0-1.
        assert_eq!(connections.len(), 4);

        let horizontal = connections.iter().find(|c| c.from == 0 && c.to == 1).unwrap();
        // Half cells: cond * 2 / (10 / 2)
        let t1 = 1. * 2. / 5.;
        let t2 = 2. * 2. / 5.;
        assert!((horizontal.transmissibility - 1. / (1. / t1 + 1. / t2)).abs() < 1e-12);
    }

    #[test]
    fn well_connections() {
        let grid = grid();
        let radial = WellConnection::Radial {
            well_radius: 0.1,
            skin_factor: 0.,
        };
        let t = grid.well_transmissibility(&radial, 1.).unwrap();
        // Well cell (0, 1): conductivity 3, 10 x 2
        let r0 = 0.14 * 10f64.hypot(2.);
        assert!((t - 2. * std::f64::consts::PI * 3. / (r0 / 0.1).ln()).abs() < 1e-9);

        let linear = WellConnection::Linear {
            perforation: Perforation {
                length_vertical: 2.,
                length_horizontal: 0.,
                efficiency: 1.,
            },
            skin_factor: 0.,
        };
        assert!(grid.well_transmissibility(&linear, 1.).unwrap() > 0.);

        // Well in the closed bottom row
        let closed = FractureGrid::new(
            vec![-10., 0., 10.],
            vec![100., 102., 104., 106.],
            105.,
            &[1., 2., 3., 4., 0., 0.],
        )
        .unwrap();
        assert!(closed.well_transmissibility(&radial, 1.).is_none());
    }

    #[test]
    fn invalid_definitions() {
        assert_eq!(
            FractureGrid::new(vec![0.], vec![0., 1.], 0., &[]).unwrap_err(),
            FractureError::TooFewCoordinates("x")
        );
        assert_eq!(
            FractureGrid::new(vec![0., 1.], vec![1., 0.], 0., &[1.]).unwrap_err(),
            FractureError::UnsortedCoordinates("depth")
        );
        assert_eq!(
            FractureGrid::new(vec![0., 1.], vec![0., 1.], 0., &[1., 2.]).unwrap_err(),
            FractureError::WrongConductivityCount {
                expected: 1,
                actual: 2
            }
        );
    }
}
