use std::cell::OnceCell;

use itertools::zip_eq;
use parry3d_f64::na::Vector3;
use tracing::{debug, trace, warn};

use super::{FractureCell, FracturePlacement};
use crate::computational_geometry::{
    bounding_box, find_cell_local_xyz, intersect_polygons, is_parallel,
    plane_hex_cell_intersection, polygon_area, polygon_area_weighted_length, Plane, Polygon,
};
use crate::grid::{GridAccessor, GridError, StaticProperty};
use crate::transmissibility::{euclidean_combination, matrix_transmissibility};

const PARALLEL_EPS: f64 = 1e-9;

/// Matrix transmissibilities of one grid cell in the cell's local directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalTransmissibility {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DirectionalTransmissibility {
    pub fn combined(&self) -> f64 {
        euclidean_combination(self.x, self.y, self.z)
    }
}

/// Contact between the fracture cell and one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellContribution {
    pub cell_index: usize,
    pub transmissibility: f64,
    pub directional: DirectionalTransmissibility,
    /// Fracture area inside the grid cell, in template units
    pub area: f64,
    /// Fracture area projected on the cell faces, `(Ax, Ay, Az)`, where `Ay`
    /// faces the local x direction and `Ax` the local y direction
    pub projected_area: Vector3<f64>,
    pub area_weighted_length: f64,
}

/// Grid cells receiving flow from one fracture cell
///
/// Cell indices and transmissibilities are parallel arrays in ascending cell
/// index order. Cells without positive contact area are not listed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionResult {
    cell_indices: Vec<usize>,
    transmissibilities: Vec<f64>,
    details: Vec<CellContribution>,
}

impl ContributionResult {
    fn push(&mut self, contribution: CellContribution) {
        self.cell_indices.push(contribution.cell_index);
        self.transmissibilities.push(contribution.transmissibility);
        self.details.push(contribution);
    }

    pub fn cell_indices(&self) -> &[usize] {
        &self.cell_indices
    }

    pub fn transmissibilities(&self) -> &[f64] {
        &self.transmissibilities
    }

    pub fn details(&self) -> &[CellContribution] {
        &self.details
    }

    pub fn len(&self) -> usize {
        self.cell_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_indices.is_empty()
    }

    /// `(cell index, transmissibility)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        zip_eq(
            self.cell_indices.iter().copied(),
            self.transmissibilities.iter().copied(),
        )
    }

    /// Fracture area in contact with the grid.
    pub fn total_area(&self) -> f64 {
        self.details.iter().map(|d| d.area).sum()
    }
}

/// Matrix to fracture transmissibility of one fracture template cell
///
/// The calculation runs on the first call to any of the accessors and the
/// result is kept for later calls, including an empty result. The calculator
/// borrows the grid and is not `Sync`; use one instance per fracture cell.
pub struct StimPlanCellTransmissibilityCalculator<'a, G: GridAccessor + ?Sized> {
    grid: &'a G,
    placement: FracturePlacement,
    skin_factor: f64,
    c_darcy: f64,
    fracture_cell: &'a FractureCell,
    contributions: OnceCell<ContributionResult>,
}

impl<'a, G: GridAccessor + ?Sized> StimPlanCellTransmissibilityCalculator<'a, G> {
    /// # Arguments
    ///
    /// * `grid` - Reservoir grid with static properties
    /// * `placement` - Template to grid transform of the fracture
    /// * `skin_factor` - Fracture face skin
    /// * `c_darcy` - Darcy constant of the grid's unit system
    /// * `fracture_cell` - Template cell to connect
    pub fn new(
        grid: &'a G,
        placement: FracturePlacement,
        skin_factor: f64,
        c_darcy: f64,
        fracture_cell: &'a FractureCell,
    ) -> Self {
        Self {
            grid,
            placement,
            skin_factor,
            c_darcy,
            fracture_cell,
            contributions: OnceCell::new(),
        }
    }

    pub fn contributing_cell_indices(&self) -> &[usize] {
        self.contributions().cell_indices()
    }

    pub fn contributing_transmissibilities(&self) -> &[f64] {
        self.contributions().transmissibilities()
    }

    pub fn contributions(&self) -> &ContributionResult {
        self.contributions
            .get_or_init(|| self.calculate_matrix_transmissibility())
    }

    pub fn into_contributions(mut self) -> ContributionResult {
        match self.contributions.take() {
            Some(contributions) => contributions,
            None => self.calculate_matrix_transmissibility(),
        }
    }

    fn calculate_matrix_transmissibility(&self) -> ContributionResult {
        let mut result = ContributionResult::default();

        // Zero conductivity: cell outside the propped fracture
        if !self.fracture_cell.is_open() {
            trace!(
                "Fracture cell {:?} is closed, conductivity {}",
                self.fracture_cell.index(),
                self.fracture_cell.conductivity()
            );
            return result;
        }

        let Some(fracture_plane) = self.placement.plane() else {
            warn!("Fracture placement does not define a plane");
            return result;
        };

        let polygon_global: Polygon = self
            .fracture_cell
            .polygon()
            .iter()
            .map(|p| self.placement.transform_point(p))
            .collect();
        let Some(polygon_bbox) = bounding_box(&polygon_global) else {
            return result;
        };

        let mut candidates = self.grid.find_intersecting_cells(&polygon_bbox);
        candidates.sort_unstable();
        candidates.dedup();

        for cell_index in candidates {
            if !self.grid.is_active(cell_index) {
                continue;
            }

            match self.cell_contribution(cell_index, &fracture_plane) {
                Ok(Some(contribution)) => result.push(contribution),
                Ok(None) => {}
                Err(e) => warn!("Skipping cell {}: {}", cell_index, e),
            }
        }

        debug!(
            "Fracture cell {:?} connects to {} grid cells",
            self.fracture_cell.index(),
            result.len()
        );

        result
    }

    /// Direction used for the effective fracture length: horizontal in the
    /// template plane for a cell with vertical local z.
    fn length_direction(&self, local_z: &Vector3<f64>) -> Vector3<f64> {
        let local_z_in_fracture_plane = self.placement.inverse_transform_vector(local_z);
        match local_z_in_fracture_plane.try_normalize(f64::EPSILON) {
            Some(z) if !is_parallel(&z, &Vector3::z(), PARALLEL_EPS) => z
                .cross(&Vector3::z())
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::x),
            // Cell z along the fracture normal
            _ => Vector3::x(),
        }
    }

    fn cell_contribution(
        &self,
        cell_index: usize,
        fracture_plane: &Plane,
    ) -> Result<Option<CellContribution>, GridError> {
        let property = |p: StaticProperty| self.grid.scalar_property(p, cell_index);
        let perm_x = property(StaticProperty::PermX)?;
        let perm_y = property(StaticProperty::PermY)?;
        let perm_z = property(StaticProperty::PermZ)?;
        let dx = property(StaticProperty::Dx)?;
        let dy = property(StaticProperty::Dy)?;
        let dz = property(StaticProperty::Dz)?;
        let ntg = property(StaticProperty::Ntg)?;

        let hex_corners = self.grid.cell_corner_vertices(cell_index);
        let Some(plane_cell_polygons) = plane_hex_cell_intersection(&hex_corners, fracture_plane)
        else {
            return Ok(None);
        };
        if plane_cell_polygons.is_empty() {
            return Ok(None);
        }

        let (local_x, local_y, local_z) = find_cell_local_xyz(&hex_corners);

        // Intersect in the template plane, where the fracture polygon lives
        let fracture_polygon = self.fracture_cell.polygon();
        let fracture_parts: Vec<Polygon> = plane_cell_polygons
            .iter()
            .map(|polygon| {
                polygon
                    .iter()
                    .map(|p| self.placement.inverse_transform_point(p))
                    .collect::<Polygon>()
            })
            .flat_map(|polygon| intersect_polygons(&polygon, fracture_polygon))
            .collect();

        if fracture_parts.is_empty() {
            return Ok(None);
        }

        let direction_of_length = self.length_direction(&local_z);
        let normal = fracture_plane.normal;

        let mut fracture_area = 0.;
        let mut total_area_x_length = 0.;
        let mut projected_area = Vector3::zeros();
        for part in &fracture_parts {
            let area = polygon_area(part);
            let length = polygon_area_weighted_length(&direction_of_length, part);

            fracture_area += area;
            total_area_x_length += length * area;

            projected_area.x += (area * normal.dot(&local_y)).abs();
            projected_area.y += (area * normal.dot(&local_x)).abs();
            projected_area.z += (area * normal.dot(&local_z)).abs();
        }

        if !(fracture_area > 0.) {
            return Ok(None);
        }
        let area_weighted_length = total_area_x_length / fracture_area;

        let directional = DirectionalTransmissibility {
            x: matrix_transmissibility(
                perm_y,
                ntg,
                projected_area.y,
                dx,
                self.skin_factor,
                area_weighted_length,
                self.c_darcy,
            ),
            y: matrix_transmissibility(
                perm_x,
                ntg,
                projected_area.x,
                dy,
                self.skin_factor,
                area_weighted_length,
                self.c_darcy,
            ),
            z: matrix_transmissibility(
                perm_z,
                1.,
                projected_area.z,
                dz,
                self.skin_factor,
                area_weighted_length,
                self.c_darcy,
            ),
        };

        Ok(Some(CellContribution {
            cell_index,
            transmissibility: directional.combined(),
            directional,
            area: fracture_area,
            projected_area,
            area_weighted_length,
        }))
    }
}

#[cfg(test)]
mod tests {
    use parry3d_f64::bounding_volume::Aabb;
    use parry3d_f64::na::Point3;

    use super::*;
    use crate::grid::CartesianGrid;

    /// Counts accessor calls to check the result is cached.
    struct CountingGrid {
        grid: CartesianGrid,
        queries: std::cell::Cell<usize>,
    }

    impl GridAccessor for CountingGrid {
        fn find_intersecting_cells(&self, bounding_box: &Aabb) -> Vec<usize> {
            self.queries.set(self.queries.get() + 1);
            self.grid.find_intersecting_cells(bounding_box)
        }

        fn is_active(&self, cell_index: usize) -> bool {
            self.grid.is_active(cell_index)
        }

        fn cell_corner_vertices(&self, cell_index: usize) -> [Point3<f64>; 8] {
            self.grid.cell_corner_vertices(cell_index)
        }

        fn scalar_property(
            &self,
            property: StaticProperty,
            cell_index: usize,
        ) -> Result<f64, GridError> {
            self.grid.scalar_property(property, cell_index)
        }
    }

    fn cube_grid() -> CartesianGrid {
        let mut grid =
            CartesianGrid::new(Point3::origin(), &[10.], &[10.], &[10.]).unwrap();
        for property in [
            StaticProperty::PermX,
            StaticProperty::PermY,
            StaticProperty::PermZ,
        ] {
            grid.set_property(property, vec![100.]).unwrap();
        }
        grid
    }

    fn square_cell(half: f64, conductivity: f64) -> FractureCell {
        FractureCell::new(
            vec![
                Point3::new(-half, -half, 0.),
                Point3::new(half, -half, 0.),
                Point3::new(half, half, 0.),
                Point3::new(-half, half, 0.),
            ],
            conductivity,
        )
        .unwrap()
    }

    #[test]
    fn results_are_computed_once() {
        let grid = CountingGrid {
            grid: cube_grid(),
            queries: std::cell::Cell::new(0),
        };
        let cell = square_cell(2., 10.);
        let placement = FracturePlacement::from_orientation(Point3::new(5., 5., 5.), 0., 0.);
        let calculator =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell);

        assert_eq!(calculator.contributing_cell_indices(), &[0]);
        assert_eq!(calculator.contributing_transmissibilities().len(), 1);
        assert_eq!(calculator.contributing_cell_indices(), &[0]);
        assert_eq!(grid.queries.get(), 1);
    }

    #[test]
    fn empty_results_are_cached_too() {
        let grid = CountingGrid {
            grid: cube_grid(),
            queries: std::cell::Cell::new(0),
        };
        let cell = square_cell(2., 10.);
        let placement = FracturePlacement::from_orientation(Point3::new(50., 5., 5.), 0., 0.);
        let calculator =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell);

        assert!(calculator.contributing_cell_indices().is_empty());
        assert!(calculator.contributing_transmissibilities().is_empty());
        assert_eq!(grid.queries.get(), 1);
    }

    #[test]
    fn closed_cell_never_touches_the_grid() {
        let grid = CountingGrid {
            grid: cube_grid(),
            queries: std::cell::Cell::new(0),
        };
        let cell = square_cell(2., 0.5e-7);
        let placement = FracturePlacement::from_orientation(Point3::new(5., 5., 5.), 0., 0.);
        let calculator =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell);

        assert!(calculator.contributions().is_empty());
        assert_eq!(grid.queries.get(), 0);
    }

    #[test]
    fn horizontal_fracture_flows_vertically() {
        let grid = cube_grid();
        let cell = square_cell(2., 10.);
        let placement = FracturePlacement::from_orientation(Point3::new(5., 5., 5.), 0., 0.);
        let calculator =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell);

        let detail = &calculator.contributions().details()[0];
        assert!((detail.area - 16.).abs() < 1e-9);
        assert!(detail.projected_area.x.abs() < 1e-12);
        assert!(detail.projected_area.y.abs() < 1e-12);
        assert!((detail.projected_area.z - 16.).abs() < 1e-9);
        // T_z = 8 * c * permZ * A / dz
        assert!((detail.directional.z - 8. * 100. * 16. / 10.).abs() < 1e-6);
        assert_eq!(detail.directional.x, 0.);
        assert!((detail.transmissibility - detail.directional.z).abs() < 1e-9);
    }

    #[test]
    fn vertical_fracture_uses_horizontal_permeability() {
        let mut grid = cube_grid();
        grid.set_property(StaticProperty::PermX, vec![50.]).unwrap();
        grid.set_property(StaticProperty::PermY, vec![200.]).unwrap();
        let cell = square_cell(2., 10.);
        // Fracture plane x = 5, normal along global x
        let placement =
            FracturePlacement::from_orientation(Point3::new(5., 5., 5.), 90., 90.);
        let calculator =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell);

        let detail = &calculator.contributions().details()[0];
        assert!((detail.projected_area.y - 16.).abs() < 1e-9);
        assert!(detail.projected_area.x.abs() < 1e-9);
        assert!(detail.projected_area.z.abs() < 1e-9);
        assert!((detail.directional.x - 8. * 200. * 16. / 10.).abs() < 1e-6);
        // Horizontal length of the 4 x 4 fracture part
        assert!((detail.area_weighted_length - 4.).abs() < 1e-9);
    }

    #[test]
    fn skin_reduces_transmissibility() {
        let grid = cube_grid();
        let cell = square_cell(2., 10.);
        let placement =
            FracturePlacement::from_orientation(Point3::new(5., 5., 5.), 90., 90.);

        let clean = StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell)
            .into_contributions();
        let damaged =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 2., 1., &cell)
                .into_contributions();
        assert!(damaged.transmissibilities()[0] < clean.transmissibilities()[0]);
    }

    #[test]
    fn missing_property_skips_the_cell() {
        let grid = CartesianGrid::new(Point3::origin(), &[10.], &[10.], &[10.]).unwrap();
        let cell = square_cell(2., 10.);
        let placement = FracturePlacement::from_orientation(Point3::new(5., 5., 5.), 0., 0.);
        let calculator =
            StimPlanCellTransmissibilityCalculator::new(&grid, placement, 0., 1., &cell);
        assert!(calculator.contributions().is_empty());
    }
}
