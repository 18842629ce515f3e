use std::fs::File;
use std::path::Path;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fractrans_rs::{
    error::FractransError,
    fracture::compute_matrix_connections,
    io::input::read_input,
    io::output::{write_internal_connections, write_matrix_connections},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to input file
    input_file: String,

    /// Path to output folder
    output_folder: String,
}

fn main() -> Result<(), FractransError> {
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.output_folder)?;
    let output_folder = Path::new(&cli.output_folder);
    let log_file = File::create(output_folder.join("fractrans_log.json"))?;

    // Setup tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stdout),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(log_file),
        )
        .init();

    info!("Starting fractrans-rs");

    let input = read_input(&cli.input_file)?;
    let unit_system = input.unit_system()?;
    let c_darcy = unit_system.darcy_constant();
    info!("Unit system {}, Darcy constant {}", unit_system, c_darcy);

    let grid = input.build_grid()?;
    let fracture_grid = input.build_fracture_grid()?;
    let placement = input.placement();

    let connections = compute_matrix_connections(
        &grid,
        &fracture_grid,
        &placement,
        input.skinFactor,
        c_darcy,
    );
    if connections.connection_count() == 0 {
        warn!("The fracture does not intersect any active grid cell");
    }

    let internal_connections = fracture_grid.internal_connections(c_darcy);
    let well_transmissibility = match input.well_connection()? {
        Some(well_connection) => {
            let transmissibility = fracture_grid.well_transmissibility(&well_connection, c_darcy);
            if transmissibility.is_none() {
                warn!("The well does not cross an open fracture cell");
            }
            transmissibility
        }
        None => None,
    };

    write_matrix_connections(
        output_folder.join("fracture_matrix_connections.txt"),
        &grid,
        &fracture_grid,
        &connections,
    )?;
    write_internal_connections(
        output_folder.join("fracture_internal_connections.txt"),
        &fracture_grid,
        &internal_connections,
        well_transmissibility,
    )?;

    let totals = connections.reservoir_cell_totals();
    info!("Fracture to matrix connections: {}", connections.connection_count());
    info!("Connected reservoir cells: {}", totals.len());
    info!(
        "Total matrix transmissibility: {:.6e}",
        totals.values().sum::<f64>()
    );
    info!("Fracture area in contact: {:.3}", connections.total_area());
    info!("Internal fracture connections: {}", internal_connections.len());
    if let Some(transmissibility) = well_transmissibility {
        info!("Fracture to well transmissibility: {:.6e}", transmissibility);
    }
    info!("Version of fractrans-rs: {}", env!("CARGO_PKG_VERSION"));

    Ok(())
}
