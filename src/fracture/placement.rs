use parry3d_f64::na::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};

use super::FractureError;
use crate::computational_geometry::Plane;

/// Placement of a fracture template in the reservoir
///
/// Affine transform from the template plane (local XY, normal along local Z)
/// into global grid coordinates. The inverse is computed once on creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FracturePlacement {
    transform: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl FracturePlacement {
    /// Use an arbitrary affine transform, which may include scaling.
    pub fn from_matrix(transform: Matrix4<f64>) -> Result<Self, FractureError> {
        let inverse = transform
            .try_inverse()
            .ok_or(FractureError::SingularPlacement)?;
        Ok(Self { transform, inverse })
    }

    /// Rigid placement at `anchor`
    ///
    /// The template is first tilted by `dip` degrees around its own x axis,
    /// then rotated by `azimuth` degrees around the global z axis. With both
    /// angles zero the fracture is horizontal; a dip of 90 degrees makes the
    /// template y axis vertical.
    pub fn from_orientation(anchor: Point3<f64>, azimuth: f64, dip: f64) -> Self {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), azimuth.to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), dip.to_radians());
        let isometry = Isometry3::from_parts(Translation3::from(anchor.coords), rotation);

        Self {
            transform: isometry.to_homogeneous(),
            inverse: isometry.inverse().to_homogeneous(),
        }
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.transform.transform_point(p)
    }

    /// Global point into template coordinates.
    pub fn inverse_transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.inverse.transform_point(p)
    }

    /// Global direction into template coordinates (translation ignored).
    pub fn inverse_transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.inverse.transform_vector(v)
    }

    /// The fracture plane in global coordinates.
    pub fn plane(&self) -> Option<Plane> {
        Plane::from_transform(&self.transform)
    }
}
