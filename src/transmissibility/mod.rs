//! Fracture transmissibility equations
//!
//! All functions are pure. `c_darcy` is the Darcy constant of the unit system
//! the inputs are given in, see [`UnitSystem::darcy_constant`].

use std::f64::consts::PI;

mod units;

pub use units::{UnitSystem, UnknownUnitSystem};

/// Skin factors with smaller magnitude are treated as zero.
const SKIN_EPS: f64 = 1e-9;

/// Matrix to fracture transmissibility for one flow direction
///
/// `T = 8 * c * perm * ntg * area / (d + s * L / pi)`
///
/// The `s * L / pi` term only enters for a non-zero skin factor. A
/// non-positive denominator (collapsed cell, strongly negative skin) gives 0.
///
/// # Arguments
///
/// * `perm` - Permeability across the fracture face
/// * `ntg` - Net to gross, 1 for vertical flow
/// * `area` - Fracture area projected on the flow direction
/// * `cell_size` - Cell dimension in the flow direction
/// * `skin_factor` - Fracture face skin
/// * `area_weighted_length` - Effective fracture length in the cell
/// * `c_darcy` - Darcy constant
pub fn matrix_transmissibility(
    perm: f64,
    ntg: f64,
    area: f64,
    cell_size: f64,
    skin_factor: f64,
    area_weighted_length: f64,
    c_darcy: f64,
) -> f64 {
    let sl_div_pi = if skin_factor.abs() > SKIN_EPS {
        skin_factor * area_weighted_length / PI
    } else {
        0.
    };

    let denominator = cell_size + sl_div_pi;
    if !(denominator > 0.) {
        return 0.;
    }

    8. * c_darcy * (perm * ntg) * area / denominator
}

/// Combines directional transmissibilities as orthogonal vector components.
pub fn euclidean_combination(tx: f64, ty: f64, tz: f64) -> f64 {
    (tx * tx + ty * ty + tz * tz).sqrt()
}

/// Transmissibility from the centre of a fracture cell to its edge
///
/// # Arguments
///
/// * `conductivity` - Fracture cell conductivity
/// * `side_length_parallel` - Cell size along the flow
/// * `side_length_normal` - Cell size across the flow
/// * `c_darcy` - Darcy constant
pub fn stimplan_cell_transmissibility_in_fracture(
    conductivity: f64,
    side_length_parallel: f64,
    side_length_normal: f64,
    c_darcy: f64,
) -> f64 {
    if !(side_length_parallel > 0.) {
        return 0.;
    }
    c_darcy * conductivity * side_length_normal / (side_length_parallel / 2.)
}

/// Half-cell description used for centre to centre connections.
#[derive(Clone, Copy, Debug)]
pub struct FractureHalfCell {
    pub conductivity: f64,
    pub side_length_parallel: f64,
    pub side_length_normal: f64,
}

/// Centre to centre transmissibility between two neighbouring fracture
/// cells: the harmonic sum of both centre to edge transmissibilities.
pub fn center_to_center_transmissibility(
    cell1: &FractureHalfCell,
    cell2: &FractureHalfCell,
    c_darcy: f64,
) -> f64 {
    let trans1 = stimplan_cell_transmissibility_in_fracture(
        cell1.conductivity,
        cell1.side_length_parallel,
        cell1.side_length_normal,
        c_darcy,
    );
    let trans2 = stimplan_cell_transmissibility_in_fracture(
        cell2.conductivity,
        cell2.side_length_parallel,
        cell2.side_length_normal,
        c_darcy,
    );

    if trans1 <= 0. || trans2 <= 0. {
        return 0.;
    }
    1. / (1. / trans1 + 1. / trans2)
}

/// Radial transmissibility from a fracture cell into a well crossing it
///
/// Uses a Peaceman type equivalent radius `r0 = 0.14 * sqrt(sx^2 + sz^2)`,
/// never less than `1.1 * well_radius`.
pub fn radial_transmissibility_to_well(
    conductivity: f64,
    cell_size_x: f64,
    cell_size_z: f64,
    well_radius: f64,
    skin_factor: f64,
    c_darcy: f64,
) -> f64 {
    if !(well_radius > 0.) {
        return 0.;
    }

    let r0 = (0.14 * cell_size_x.hypot(cell_size_z)).max(well_radius * 1.1);
    let denominator = (r0 / well_radius).ln() + skin_factor;
    if !(denominator > 0.) {
        return 0.;
    }

    2. * PI * c_darcy * conductivity / denominator
}

/// Perforated interval of a well through a fracture cell.
#[derive(Clone, Copy, Debug)]
pub struct Perforation {
    pub length_vertical: f64,
    pub length_horizontal: f64,
    pub efficiency: f64,
}

/// Linear transmissibility from a fracture cell into a perforated interval,
/// combining the horizontal and vertical inflow like the matrix directions.
pub fn linear_transmissibility_to_well(
    conductivity: f64,
    cell_size_x: f64,
    cell_size_z: f64,
    perforation: &Perforation,
    skin_factor: f64,
    c_darcy: f64,
) -> f64 {
    let prefix = 8. * c_darcy * conductivity;
    let dz_perf = perforation.length_vertical * perforation.efficiency;
    let dx_perf = perforation.length_horizontal * perforation.efficiency;

    let directional = |perf: f64, cell_size: f64| {
        let denominator = cell_size + skin_factor * perf / PI;
        if denominator > 0. {
            prefix * perf / denominator
        } else {
            0.
        }
    };

    let tc_z = directional(dz_perf, cell_size_x);
    let tc_x = directional(dx_perf, cell_size_z);
    tc_x.hypot(tc_z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_relative_eq(a: f64, b: f64) {
        assert!(
            (a - b).abs() <= 1e-9 * b.abs().max(1e-300),
            "{a} != {b}"
        );
    }

    #[test]
    fn matrix_transmissibility_without_skin() {
        let c = UnitSystem::Metric.darcy_constant();
        let t = matrix_transmissibility(100., 0.5, 40., 10., 0., 1234., c);
        assert_relative_eq(t, 8. * c * 100. * 0.5 * 40. / 10.);
    }

    #[test]
    fn tiny_skin_is_ignored() {
        let with = matrix_transmissibility(100., 1., 40., 10., 1e-12, 50., 1.);
        let without = matrix_transmissibility(100., 1., 40., 10., 0., 50., 1.);
        assert_eq!(with, without);
    }

    #[test]
    fn skin_adds_resistance() {
        let t = matrix_transmissibility(100., 1., 40., 10., 2., 5. * PI, 1.);
        // d + s * L / pi = 10 + 2 * 5
        assert_relative_eq(t, 8. * 100. * 40. / 20.);
    }

    #[test]
    fn collapsed_cell_gives_zero() {
        assert_eq!(matrix_transmissibility(100., 1., 40., 0., 0., 1., 1.), 0.);
        assert_eq!(matrix_transmissibility(100., 1., 40., 1., -10., 10., 1.), 0.);
    }

    #[test]
    fn euclidean_law() {
        assert_relative_eq(euclidean_combination(3., 4., 12.), 13.);
        assert_eq!(euclidean_combination(0., 0., 0.), 0.);
    }

    #[test]
    fn in_fracture_transmissibility() {
        let t = stimplan_cell_transmissibility_in_fracture(2., 4., 3., 0.5);
        assert_relative_eq(t, 0.5 * 2. * 3. / 2.);
        assert_eq!(stimplan_cell_transmissibility_in_fracture(2., 0., 3., 0.5), 0.);
    }

    #[test]
    fn center_to_center_is_harmonic() {
        let cell = FractureHalfCell {
            conductivity: 2.,
            side_length_parallel: 4.,
            side_length_normal: 3.,
        };
        let half = stimplan_cell_transmissibility_in_fracture(2., 4., 3., 1.);
        assert_relative_eq(center_to_center_transmissibility(&cell, &cell, 1.), half / 2.);

        let closed = FractureHalfCell {
            conductivity: 0.,
            ..cell
        };
        assert_eq!(center_to_center_transmissibility(&cell, &closed, 1.), 0.);
    }

    #[test]
    fn radial_inflow_uses_equivalent_radius() {
        let t = radial_transmissibility_to_well(10., 3., 4., 0.1, 0.5, 1.);
        let r0 = 0.14 * 5.;
        assert_relative_eq(t, 2. * PI * 10. / ((r0 / 0.1f64).ln() + 0.5));

        // Small cells clamp the radius to 1.1 * rw
        let t = radial_transmissibility_to_well(10., 0.1, 0.1, 0.1, 0., 1.);
        assert_relative_eq(t, 2. * PI * 10. / 1.1f64.ln());
    }

    #[test]
    fn linear_inflow_combines_directions() {
        let perforation = Perforation {
            length_vertical: 2.,
            length_horizontal: 4.,
            efficiency: 0.5,
        };
        let t = linear_transmissibility_to_well(1., 10., 20., &perforation, 0., 1.);
        let tc_z: f64 = 8. * 1. / 10.;
        let tc_x: f64 = 8. * 2. / 20.;
        assert_relative_eq(t, (tc_x * tc_x + tc_z * tc_z).sqrt());
    }
}
