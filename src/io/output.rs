use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::fracture::{FractureConnection, FractureGrid, FractureMatrixConnections};
use crate::grid::CartesianGrid;

/// Writes the matrix to fracture connections, one line per fracture cell and
/// reservoir cell pair, followed by the summed transmissibility per
/// reservoir cell.
///
/// # Arguments
///
/// * `path` - Output file
/// * `grid` - Reservoir grid, used for the i j k indices
/// * `fracture_grid` - Fracture template
/// * `connections` - Result of the matrix connection calculation
pub fn write_matrix_connections(
    path: impl AsRef<Path>,
    grid: &CartesianGrid,
    fracture_grid: &FractureGrid,
    connections: &FractureMatrixConnections,
) -> std::io::Result<()> {
    info!("Writing {}", path.as_ref().display());
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "# fracI fracJ  I J K  transmissibility area")?;
    for (fracture_cell_index, contributions) in connections.per_fracture_cell() {
        let (fi, fj) = fracture_grid.cells()[*fracture_cell_index].index();
        for detail in contributions.details() {
            let (i, j, k) = grid.ijk(detail.cell_index);
            writeln!(
                file,
                "{} {}  {} {} {}  {:.6e} {:.6e}",
                fi + 1,
                fj + 1,
                i + 1,
                j + 1,
                k + 1,
                detail.transmissibility,
                detail.area
            )?;
        }
    }

    writeln!(file, "# I J K  total transmissibility")?;
    for (cell_index, total) in connections.reservoir_cell_totals() {
        let (i, j, k) = grid.ijk(cell_index);
        writeln!(file, "{} {} {}  {:.6e}", i + 1, j + 1, k + 1, total)?;
    }

    file.flush()
}

/// Writes the connections between fracture cells and the well connection.
///
/// # Arguments
///
/// * `path` - Output file
/// * `fracture_grid` - Fracture template
/// * `connections` - Neighbour connections inside the fracture
/// * `well_transmissibility` - Well cell to well transmissibility, if any
pub fn write_internal_connections(
    path: impl AsRef<Path>,
    fracture_grid: &FractureGrid,
    connections: &[FractureConnection],
    well_transmissibility: Option<f64>,
) -> std::io::Result<()> {
    info!("Writing {}", path.as_ref().display());
    let mut file = BufWriter::new(File::create(path)?);
    let cells = fracture_grid.cells();

    writeln!(file, "# fracI fracJ  fracI fracJ  transmissibility")?;
    for connection in connections {
        let (i1, j1) = cells[connection.from].index();
        let (i2, j2) = cells[connection.to].index();
        writeln!(
            file,
            "{} {}  {} {}  {:.6e}",
            i1 + 1,
            j1 + 1,
            i2 + 1,
            j2 + 1,
            connection.transmissibility
        )?;
    }

    if let (Some(transmissibility), Some(well_cell)) =
        (well_transmissibility, fracture_grid.well_cell())
    {
        let (i, j) = well_cell.index();
        writeln!(file, "# fracI fracJ  well transmissibility")?;
        writeln!(file, "{} {}  {:.6e}", i + 1, j + 1, transmissibility)?;
    }

    file.flush()
}
