//! The ten-coefficient implicit quadric equation.
//!
//! `f(x,y,z) = A x² + B y² + C z² + D xy + E xz + F yz + G x + H y + J z + K`
//!
//! In homogeneous form `f = [p 1] M [p 1]ᵀ` with the symmetric matrix
//!
//! ```text
//! | A    D/2  E/2  G/2 |
//! | D/2  B    F/2  H/2 |
//! | E/2  F/2  C    J/2 |
//! | G/2  H/2  J/2  K   |
//! ```
//!
//! which makes affine transforms a congruence: `M' = T⁻ᵀ M T⁻¹`.

use quadcell_math::{Mat3, Mat4, Point3, Transform, Vec3};

/// Coefficients `[A, B, C, D, E, F, G, H, J, K]` of an implicit quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    /// The ten coefficients in `A..K` order.
    pub coeffs: [f64; 10],
}

impl Quadric {
    /// Wrap raw coefficients.
    pub fn new(coeffs: [f64; 10]) -> Self {
        Self { coeffs }
    }

    /// All coefficients zero (used by non-quadric surfaces).
    pub fn zero() -> Self {
        Self { coeffs: [0.0; 10] }
    }

    /// The plane `n·p - d = 0`.
    pub fn plane(normal: &Vec3, distance: f64) -> Self {
        let mut coeffs = [0.0; 10];
        coeffs[6] = normal.x;
        coeffs[7] = normal.y;
        coeffs[8] = normal.z;
        coeffs[9] = -distance;
        Self { coeffs }
    }

    /// The quadric `(p - c)ᵀ M (p - c) + k` for a symmetric `M`.
    pub fn from_form(m: &Mat3, centre: &Point3, k: f64) -> Self {
        let c = centre.coords;
        let linear = -2.0 * (m * c);
        let constant = c.dot(&(m * c)) + k;
        Self {
            coeffs: [
                m[(0, 0)],
                m[(1, 1)],
                m[(2, 2)],
                2.0 * m[(0, 1)],
                2.0 * m[(0, 2)],
                2.0 * m[(1, 2)],
                linear.x,
                linear.y,
                linear.z,
                constant,
            ],
        }
    }

    /// Evaluate the implicit function at a point.
    pub fn eval(&self, p: &Point3) -> f64 {
        let [a, b, c, d, e, f, g, h, j, k] = self.coeffs;
        let (x, y, z) = (p.x, p.y, p.z);
        a * x * x + b * y * y + c * z * z + d * x * y + e * x * z + f * y * z + g * x + h * y + j * z + k
    }

    /// Gradient of the implicit function at a point.
    pub fn gradient(&self, p: &Point3) -> Vec3 {
        let [a, b, c, d, e, f, g, h, j, _] = self.coeffs;
        let (x, y, z) = (p.x, p.y, p.z);
        Vec3::new(
            2.0 * a * x + d * y + e * z + g,
            2.0 * b * y + d * x + f * z + h,
            2.0 * c * z + e * x + f * y + j,
        )
    }

    /// The symmetric 3x3 matrix of the second-order terms.
    pub fn quadratic_form(&self) -> Mat3 {
        let [a, b, c, d, e, f, ..] = self.coeffs;
        Mat3::new(a, d / 2.0, e / 2.0, d / 2.0, b, f / 2.0, e / 2.0, f / 2.0, c)
    }

    /// The first-order coefficients `(G, H, J)`.
    pub fn linear_terms(&self) -> Vec3 {
        Vec3::new(self.coeffs[6], self.coeffs[7], self.coeffs[8])
    }

    /// The constant `K`.
    pub fn constant(&self) -> f64 {
        self.coeffs[9]
    }

    /// True when every second-order coefficient vanishes.
    pub fn is_planar(&self) -> bool {
        self.coeffs[..6].iter().all(|c| c.abs() < 1e-14)
    }

    /// The symmetric homogeneous 4x4 matrix.
    pub fn to_matrix(&self) -> Mat4 {
        let [a, b, c, d, e, f, g, h, j, k] = self.coeffs;
        Mat4::new(
            a,
            d / 2.0,
            e / 2.0,
            g / 2.0,
            d / 2.0,
            b,
            f / 2.0,
            h / 2.0,
            e / 2.0,
            f / 2.0,
            c,
            j / 2.0,
            g / 2.0,
            h / 2.0,
            j / 2.0,
            k,
        )
    }

    /// Read coefficients back from a homogeneous matrix, symmetrising it.
    pub fn from_matrix(m: &Mat4) -> Self {
        let s = |i: usize, j: usize| m[(i, j)] + m[(j, i)];
        Self {
            coeffs: [
                m[(0, 0)],
                m[(1, 1)],
                m[(2, 2)],
                s(0, 1),
                s(0, 2),
                s(1, 2),
                s(0, 3),
                s(1, 3),
                s(2, 3),
                m[(3, 3)],
            ],
        }
    }

    /// The quadric whose zero set is the image of this one under `t`.
    ///
    /// Returns `None` if `t` is singular.
    pub fn transformed(&self, t: &Transform) -> Option<Self> {
        let inv = t.matrix.try_inverse()?;
        Some(self.congruent(&inv))
    }

    /// Apply `M' = Iᵀ M I` for an already inverted transform matrix `I`.
    pub fn congruent(&self, inverse: &Mat4) -> Self {
        let m = inverse.transpose() * self.to_matrix() * inverse;
        Self::from_matrix(&m)
    }

    /// Largest absolute coefficient difference.
    pub fn max_difference(&self, other: &Quadric) -> f64 {
        self.coeffs
            .iter()
            .zip(other.coeffs.iter())
            .fold(0.0, |m, (a, b)| m.max((a - b).abs()))
    }
}
