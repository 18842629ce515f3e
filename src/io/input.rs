use std::path::Path;

use parry3d_f64::na::Point3;
use tracing::info;

use super::InputError;
use crate::fracture::{FractureError, FractureGrid, FracturePlacement, WellConnection};
use crate::grid::{CartesianGrid, GridError, StaticProperty};
use crate::io::read_input_functions::InputReader;
use crate::transmissibility::{Perforation, UnitSystem};

#[allow(non_snake_case)]
#[derive(Debug)]
pub struct Input {
    /// METRIC, FIELD or LAB
    pub unitSystem: String,

    /// Corner of the grid with the smallest coordinates.
    pub gridOrigin: [f64; 3],

    /// Column widths along x.
    pub gridDx: Vec<f64>,

    /// Row widths along y.
    pub gridDy: Vec<f64>,

    /// Layer thicknesses along z, starting at the origin.
    pub gridDz: Vec<f64>,

    /// Permeabilities, a single value or one value per cell in
    /// `i + nx * (j + ny * k)` order.
    pub permX: Vec<f64>,
    pub permY: Vec<f64>,
    pub permZ: Vec<f64>,

    /// Net to gross, optional. Same layout as the permeabilities.
    pub ntg: Vec<f64>,

    /// Global indices of inactive cells, optional.
    pub inactiveCells: Vec<usize>,

    /// Fracture template node x coordinates, well at x = 0.
    pub fractureX: Vec<f64>,

    /// Fracture template node depths.
    pub fractureDepth: Vec<f64>,

    /// Depth of the well in the template.
    pub wellDepth: f64,

    /// Conductivity of every template cell, row by row from the top.
    pub conductivity: Vec<f64>,

    /// Grid position of the template origin.
    pub fractureAnchor: [f64; 3],

    /// Rotation of the template x axis around the global z axis, degrees.
    pub fractureAzimuth: f64,

    /// Tilt of the template around its x axis, degrees. 90 for a vertical fracture.
    pub fractureDip: f64,

    /// Fracture face skin.
    pub skinFactor: f64,

    /// none, radial or linear. Optional, defaults to none.
    pub wellConnection: String,

    /// Well radius for radial well connections.
    pub wellRadius: f64,

    /// Skin between fracture and well.
    pub wellSkinFactor: f64,

    /// Perforated lengths and efficiency for linear well connections.
    pub perforationLengthVertical: f64,
    pub perforationLengthHorizontal: f64,
    pub perforationEfficiency: f64,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            unitSystem: UnitSystem::default().to_string(),
            gridOrigin: [0.; 3],
            gridDx: Vec::new(),
            gridDy: Vec::new(),
            gridDz: Vec::new(),
            permX: Vec::new(),
            permY: Vec::new(),
            permZ: Vec::new(),
            ntg: Vec::new(),
            inactiveCells: Vec::new(),
            fractureX: Vec::new(),
            fractureDepth: Vec::new(),
            wellDepth: 0.,
            conductivity: Vec::new(),
            fractureAnchor: [0.; 3],
            fractureAzimuth: 0.,
            fractureDip: 90.,
            skinFactor: 0.,
            wellConnection: "none".to_string(),
            wellRadius: 0.,
            wellSkinFactor: 0.,
            perforationLengthVertical: 0.,
            perforationLengthHorizontal: 0.,
            perforationEfficiency: 1.,
        }
    }
}

impl Input {
    pub fn unit_system(&self) -> Result<UnitSystem, InputError> {
        Ok(self.unitSystem.parse()?)
    }

    pub fn well_connection(&self) -> Result<Option<WellConnection>, InputError> {
        match self.wellConnection.to_ascii_lowercase().as_str() {
            "none" => Ok(None),
            "radial" => Ok(Some(WellConnection::Radial {
                well_radius: self.wellRadius,
                skin_factor: self.wellSkinFactor,
            })),
            "linear" => Ok(Some(WellConnection::Linear {
                perforation: Perforation {
                    length_vertical: self.perforationLengthVertical,
                    length_horizontal: self.perforationLengthHorizontal,
                    efficiency: self.perforationEfficiency,
                },
                skin_factor: self.wellSkinFactor,
            })),
            _ => Err(InputError::UnknownWellConnection(
                self.wellConnection.clone(),
            )),
        }
    }

    pub fn build_grid(&self) -> Result<CartesianGrid, GridError> {
        let [x, y, z] = self.gridOrigin;
        let mut grid =
            CartesianGrid::new(Point3::new(x, y, z), &self.gridDx, &self.gridDy, &self.gridDz)?;

        grid.set_property(StaticProperty::PermX, self.permX.clone())?;
        grid.set_property(StaticProperty::PermY, self.permY.clone())?;
        grid.set_property(StaticProperty::PermZ, self.permZ.clone())?;
        if !self.ntg.is_empty() {
            grid.set_property(StaticProperty::Ntg, self.ntg.clone())?;
        }
        for &cell_index in &self.inactiveCells {
            grid.set_inactive(cell_index)?;
        }

        Ok(grid)
    }

    pub fn build_fracture_grid(&self) -> Result<FractureGrid, FractureError> {
        FractureGrid::new(
            self.fractureX.clone(),
            self.fractureDepth.clone(),
            self.wellDepth,
            &self.conductivity,
        )
    }

    pub fn placement(&self) -> FracturePlacement {
        let [x, y, z] = self.fractureAnchor;
        FracturePlacement::from_orientation(
            Point3::new(x, y, z),
            self.fractureAzimuth,
            self.fractureDip,
        )
    }
}

/// Reads in all input variables.
///
/// # Arguments
///
/// * `input_file` - Path to input file
pub fn read_input(input_file: impl AsRef<Path>) -> Result<Input, InputError> {
    info!("Fractrans Input File: {}", input_file.as_ref().display());
    let input_reader = InputReader::new(input_file)?;
    read_input_from(&input_reader)
}

/// Reads all input variables from an already loaded input.
pub fn read_input_from(input_reader: &InputReader) -> Result<Input, InputError> {
    let mut input_var = Input::default();

    macro_rules! input_var {
        ($var_name:ident) => {
            input_reader.read_value(
                &format!("{}:", stringify!($var_name)),
                &mut input_var.$var_name,
            )?;
        };
    }

    macro_rules! optional_input_var {
        ($var_name:ident) => {
            input_reader.read_optional_value(
                &format!("{}:", stringify!($var_name)),
                &mut input_var.$var_name,
            )?;
        };
    }

    optional_input_var!(unitSystem);
    // Fail early on a typo
    input_var.unit_system()?;

    optional_input_var!(gridOrigin);
    input_var!(gridDx);
    input_var!(gridDy);
    input_var!(gridDz);
    input_var!(permX);
    input_var!(permY);
    input_var!(permZ);
    optional_input_var!(ntg);
    optional_input_var!(inactiveCells);

    input_var!(fractureX);
    input_var!(fractureDepth);
    input_var!(wellDepth);
    input_var!(conductivity);
    input_var!(fractureAnchor);
    optional_input_var!(fractureAzimuth);
    optional_input_var!(fractureDip);
    optional_input_var!(skinFactor);

    optional_input_var!(wellConnection);
    optional_input_var!(wellSkinFactor);
    match input_var.well_connection()? {
        Some(WellConnection::Radial { .. }) => {
            input_var!(wellRadius);
        }
        Some(WellConnection::Linear { .. }) => {
            input_var!(perforationLengthVertical);
            optional_input_var!(perforationLengthHorizontal);
            optional_input_var!(perforationEfficiency);
        }
        None => {}
    }

    info!(
        "Grid: {} x {} x {} cells, {} inactive",
        input_var.gridDx.len(),
        input_var.gridDy.len(),
        input_var.gridDz.len(),
        input_var.inactiveCells.len()
    );
    info!(
        "Fracture template: {} x {} cells",
        input_var.fractureX.len().saturating_sub(1),
        input_var.fractureDepth.len().saturating_sub(1)
    );

    Ok(input_var)
}
