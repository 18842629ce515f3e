use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Eclipse unit systems.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnitSystem {
    #[default]
    Metric,
    Field,
    Lab,
}

impl UnitSystem {
    /// Darcy constant converting `mD * length` into the flow unit of the
    /// unit system (Eclipse technical description values).
    pub fn darcy_constant(&self) -> f64 {
        match self {
            UnitSystem::Metric => 0.008527,
            UnitSystem::Field => 0.001127,
            UnitSystem::Lab => 3.6,
        }
    }
}

impl Display for UnitSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "METRIC"),
            UnitSystem::Field => write!(f, "FIELD"),
            UnitSystem::Lab => write!(f, "LAB"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown unit system '{0}', expected METRIC, FIELD or LAB")]
pub struct UnknownUnitSystem(pub String);

impl FromStr for UnitSystem {
    type Err = UnknownUnitSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "METRIC" => Ok(UnitSystem::Metric),
            "FIELD" => Ok(UnitSystem::Field),
            "LAB" => Ok(UnitSystem::Lab),
            _ => Err(UnknownUnitSystem(s.to_string())),
        }
    }
}
