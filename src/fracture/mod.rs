pub mod calculator;
pub mod fracture_cell;
pub mod fracture_grid;
pub mod matrix_connections;
pub mod placement;

pub use calculator::{
    CellContribution, ContributionResult, DirectionalTransmissibility,
    StimPlanCellTransmissibilityCalculator,
};
pub use fracture_cell::{FractureCell, CONDUCTIVITY_EPS};
pub use fracture_grid::{FractureConnection, FractureGrid, WellConnection};
pub use matrix_connections::{compute_matrix_connections, FractureMatrixConnections};
pub use placement::FracturePlacement;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FractureError {
    #[error("Fracture cell polygon needs at least 3 points, got {0}")]
    TooFewPolygonPoints(usize),
    #[error("Fracture placement transform is not invertible")]
    SingularPlacement,
    #[error("Fracture grid needs at least 2 {0} coordinates")]
    TooFewCoordinates(&'static str),
    #[error("Fracture grid {0} coordinates must be strictly increasing")]
    UnsortedCoordinates(&'static str),
    #[error("Expected {expected} conductivity values, got {actual}")]
    WrongConductivityCount { expected: usize, actual: usize },
}
