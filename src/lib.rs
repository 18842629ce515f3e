pub mod computational_geometry;
pub mod error;
pub mod fracture;
pub mod grid;
pub mod io;
pub mod transmissibility;
