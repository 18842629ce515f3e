use std::fmt::{Display, Formatter};
use std::str::FromStr;

use parry3d_f64::bounding_volume::Aabb;
use parry3d_f64::na::Point3;

mod cartesian;

pub use cartesian::CartesianGrid;

/// Static cell properties read by the transmissibility calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaticProperty {
    Dx,
    Dy,
    Dz,
    PermX,
    PermY,
    PermZ,
    Ntg,
}

impl StaticProperty {
    pub const ALL: [StaticProperty; 7] = [
        StaticProperty::Dx,
        StaticProperty::Dy,
        StaticProperty::Dz,
        StaticProperty::PermX,
        StaticProperty::PermY,
        StaticProperty::PermZ,
        StaticProperty::Ntg,
    ];

    /// Eclipse keyword of the property.
    pub fn keyword(&self) -> &'static str {
        match self {
            StaticProperty::Dx => "DX",
            StaticProperty::Dy => "DY",
            StaticProperty::Dz => "DZ",
            StaticProperty::PermX => "PERMX",
            StaticProperty::PermY => "PERMY",
            StaticProperty::PermZ => "PERMZ",
            StaticProperty::Ntg => "NTG",
        }
    }
}

impl Display for StaticProperty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for StaticProperty {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaticProperty::ALL
            .into_iter()
            .find(|p| p.keyword().eq_ignore_ascii_case(s))
            .ok_or_else(|| GridError::UnknownProperty(s.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GridError {
    #[error("Unknown static property '{0}'")]
    UnknownProperty(String),
    #[error("Property {property} is not available for cell {cell_index}")]
    MissingProperty {
        property: StaticProperty,
        cell_index: usize,
    },
    #[error("Cell index {cell_index} is outside the grid ({cell_count} cells)")]
    CellOutOfRange { cell_index: usize, cell_count: usize },
    #[error("Expected {expected} values for {name}, got {actual}")]
    WrongValueCount {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Grid must have at least one cell with positive size in every direction")]
    EmptyGrid,
}

/// Read access to a structured reservoir grid
///
/// Cells are addressed by their global index. The calculator only reads
/// through this trait, implementations used from several threads must keep
/// the read path free of interior mutation.
pub trait GridAccessor {
    /// Indices of all cells whose bounding box intersects `bounding_box`.
    fn find_intersecting_cells(&self, bounding_box: &Aabb) -> Vec<usize>;

    fn is_active(&self, cell_index: usize) -> bool;

    /// The 8 cell corners in hexahedron corner order, see
    /// [`crate::computational_geometry::HEX_FACES`].
    fn cell_corner_vertices(&self, cell_index: usize) -> [Point3<f64>; 8];

    fn scalar_property(&self, property: StaticProperty, cell_index: usize)
        -> Result<f64, GridError>;
}
