use std::collections::BTreeMap;

use tracing::info;

use super::{ContributionResult, FractureGrid, FracturePlacement, StimPlanCellTransmissibilityCalculator};
use crate::grid::GridAccessor;

/// Matrix connections of every open cell of a fracture template.
#[derive(Clone, Debug, Default)]
pub struct FractureMatrixConnections {
    /// `(fracture cell index, contributions)`, only cells with connections
    per_fracture_cell: Vec<(usize, ContributionResult)>,
}

impl FractureMatrixConnections {
    /// Results keyed by index into [`FractureGrid::cells`].
    pub fn per_fracture_cell(&self) -> &[(usize, ContributionResult)] {
        &self.per_fracture_cell
    }

    /// Number of fracture cell / reservoir cell pairs.
    pub fn connection_count(&self) -> usize {
        self.per_fracture_cell.iter().map(|(_, c)| c.len()).sum()
    }

    /// Summed transmissibility from each reservoir cell into the fracture.
    pub fn reservoir_cell_totals(&self) -> BTreeMap<usize, f64> {
        let mut totals = BTreeMap::new();
        for (cell_index, transmissibility) in
            self.per_fracture_cell.iter().flat_map(|(_, c)| c.iter())
        {
            *totals.entry(cell_index).or_insert(0.) += transmissibility;
        }
        totals
    }

    /// Fracture area in contact with the reservoir.
    pub fn total_area(&self) -> f64 {
        self.per_fracture_cell
            .iter()
            .map(|(_, c)| c.total_area())
            .sum()
    }
}

/// Compute matrix to fracture transmissibilities for a whole fracture
///
/// # Arguments
///
/// * `grid` - Reservoir grid
/// * `fracture_grid` - Fracture template
/// * `placement` - Template to grid transform
/// * `skin_factor` - Fracture face skin
/// * `c_darcy` - Darcy constant of the grid's unit system
pub fn compute_matrix_connections<G: GridAccessor + ?Sized>(
    grid: &G,
    fracture_grid: &FractureGrid,
    placement: &FracturePlacement,
    skin_factor: f64,
    c_darcy: f64,
) -> FractureMatrixConnections {
    let per_fracture_cell: Vec<(usize, ContributionResult)> = fracture_grid
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_open())
        .map(|(index, cell)| {
            let calculator = StimPlanCellTransmissibilityCalculator::new(
                grid,
                *placement,
                skin_factor,
                c_darcy,
                cell,
            );
            (index, calculator.into_contributions())
        })
        .filter(|(_, contributions)| !contributions.is_empty())
        .collect();

    let connections = FractureMatrixConnections { per_fracture_cell };
    info!(
        "{} matrix connections from {} fracture cells",
        connections.connection_count(),
        connections.per_fracture_cell.len()
    );

    connections
}
