#![warn(missing_docs)]

//! Math types for the quadcell CSG kernel.
//!
//! Aliases over nalgebra for points, vectors and the matrices that carry
//! quadric forms, a homogeneous [`Transform`] for moving surfaces, the
//! sidedness [`Tolerance`], and the polynomial root solvers behind ray
//! intersection and exact surface distance.

pub mod poly;

use nalgebra::{Matrix3, Matrix4, Rotation3, Translation3, Unit, Vector3};

pub use poly::{real_roots, solve_cubic, solve_quadratic, solve_quartic};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 3x3 matrix, used for quadratic forms and rotation blocks.
pub type Mat3 = Matrix3<f64>;

/// A 4x4 matrix, used for homogeneous quadric forms.
pub type Mat4 = Matrix4<f64>;

/// An affine map of 3D space held as a homogeneous matrix.
///
/// Surfaces transform by congruence of their 4x4 form, so the full matrix
/// and its inverse are what callers need.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Homogeneous matrix; the bottom row is `[0 0 0 1]`.
    pub matrix: Mat4,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Translation3::new(dx, dy, dz).to_homogeneous(),
        }
    }

    /// Translation by a vector.
    pub fn translation_by(v: &Vec3) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    /// Axis-aligned scale. Not rigid unless every factor is 1.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_linear(&Mat3::from_diagonal(&Vec3::new(sx, sy, sz)))
    }

    /// Rotation about the x axis.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::x_axis(), angle)
    }

    /// Rotation about the y axis.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::y_axis(), angle)
    }

    /// Rotation about the z axis.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::z_axis(), angle)
    }

    /// Right-handed rotation by `angle` radians about `axis` through the
    /// origin.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        Self {
            matrix: Rotation3::from_axis_angle(axis, angle).to_homogeneous(),
        }
    }

    /// A transform with the given 3x3 linear block and no translation.
    pub fn from_linear(m: &Mat3) -> Self {
        Self {
            matrix: m.to_homogeneous(),
        }
    }

    /// `self * other`: applies `other` first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Map a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// The 3x3 linear block.
    pub fn linear_part(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation_part(&self) -> Vec3 {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// True for a proper rotation followed by a translation. Reflections and
    /// scalings are not rigid.
    pub fn is_rigid(&self) -> bool {
        let bottom = self.matrix.fixed_view::<1, 4>(3, 0);
        if bottom[0] != 0.0 || bottom[1] != 0.0 || bottom[2] != 0.0 || bottom[3] != 1.0 {
            return false;
        }
        let r = self.linear_part();
        (r.transpose() * r - Mat3::identity()).abs().max() < 1e-9 && (r.determinant() - 1.0).abs() < 1e-9
    }

    /// General inverse, or `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// `[Rᵀ | -Rᵀ t]`; exact only for rigid transforms.
    pub fn rigid_inverse(&self) -> Self {
        let rt = self.linear_part().transpose();
        let back = -(rt * self.translation_part());
        Self::translation_by(&back).then(&Self::from_linear(&rt))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Linear tolerance for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Distance below which two points coincide. Also the band around zero
    /// used when classifying a point against an implicit surface equation.
    pub linear: f64,
}

impl Tolerance {
    /// 1e-6.
    pub const DEFAULT: Self = Self { linear: 1e-6 };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn test_translation_and_scale() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        assert!(close(&t.apply_point(&Point3::new(1.0, 2.0, 3.0)), &Point3::new(11.0, 22.0, 33.0)));
        assert!((t.translation_part() - Vec3::new(10.0, 20.0, 30.0)).norm() < 1e-12);

        let s = Transform::scale(2.0, 3.0, 4.0);
        assert!(close(&s.apply_point(&Point3::new(1.0, 1.0, 1.0)), &Point3::new(2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_axis_rotations() {
        let p = Point3::new(1.0, 0.0, 0.0);
        assert!(close(&Transform::rotation_z(FRAC_PI_2).apply_point(&p), &Point3::new(0.0, 1.0, 0.0)));
        assert!(close(&Transform::rotation_y(FRAC_PI_2).apply_point(&p), &Point3::new(0.0, 0.0, -1.0)));
        let q = Point3::new(0.0, 1.0, 0.0);
        assert!(close(&Transform::rotation_x(FRAC_PI_2).apply_point(&q), &Point3::new(0.0, 0.0, 1.0)));

        // Half turn about (1,1,0) swaps x and y
        let axis = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let half = Transform::rotation_about_axis(&axis, PI);
        assert!(close(&half.apply_point(&p), &Point3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_then_applies_right_first() {
        let shift = Transform::translation(1.0, 0.0, 0.0);
        let double = Transform::scale(2.0, 2.0, 2.0);
        let p = double.then(&shift).apply_point(&Point3::origin());
        assert!(close(&p, &Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rigid_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::rotation_y(0.7));
        let inv = t.rigid_inverse();
        let p = Point3::new(-4.0, 0.5, 2.0);
        assert!(close(&inv.apply_point(&t.apply_point(&p)), &p));
        let general = t.inverse().unwrap();
        assert!((general.matrix - inv.matrix).abs().max() < 1e-12);
    }

    #[test]
    fn test_rigidity() {
        assert!(Transform::identity().is_rigid());
        let rigid = Transform::translation(1.0, -2.0, 0.5).then(&Transform::rotation_x(0.3));
        assert!(rigid.is_rigid());
        assert!(!Transform::scale(2.0, 1.0, 1.0).is_rigid());
        // Distance-preserving but mirrored
        assert!(!Transform::scale(-1.0, 1.0, 1.0).is_rigid());
        assert!(Transform::scale(0.0, 1.0, 1.0).inverse().is_none());
    }
}
