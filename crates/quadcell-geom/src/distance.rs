//! Point-to-surface distance for general quadrics.
//!
//! The exact path minimises `|x - p|²` subject to `f(x) = 0`. In the eigenbasis
//! of the quadratic form, `f(y) = Σ λᵢ yᵢ² + βᵢ yᵢ + k`, and the Lagrange
//! condition gives `yᵢ = (qᵢ - s βᵢ) / (1 + 2 s λᵢ)`. Substituting back and
//! clearing denominators leaves a polynomial of degree at most six in `s`.

use nalgebra::SymmetricEigen;
use quadcell_math::{real_roots, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::quadric::Quadric;

/// How distance to a general quadric is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSolver {
    /// First-order estimate `|f| / |∇f|`.
    #[default]
    Gradient,
    /// Closest point via the degree-6 Lagrange polynomial, falling back to
    /// [`Gradient`](Self::Gradient) when the solve fails.
    Exact,
}

impl DistanceSolver {
    /// Distance from `p` to the zero set of `q`.
    pub fn distance(self, q: &Quadric, p: &Point3) -> f64 {
        self.distance_with(q, p, &mut Diagnostics::new())
    }

    /// Like [`distance`](Self::distance), noting a fallback in `diagnostics`.
    pub fn distance_with(self, q: &Quadric, p: &Point3, diagnostics: &mut Diagnostics) -> f64 {
        match self {
            Self::Gradient => gradient_distance(q, p),
            Self::Exact => match exact_distance(q, p) {
                Some(d) => d,
                None => {
                    diagnostics.note(
                        DiagnosticKind::DistanceFallback,
                        format_args!("exact quadric distance failed at {p:?}"),
                    );
                    gradient_distance(q, p)
                }
            },
        }
    }
}

/// First-order distance estimate `|f(p)| / |∇f(p)|`.
///
/// At a stationary point of `f` the estimate degenerates; `sqrt(|f|)` is used
/// there instead, which is exact at the centre of a unit-curvature form.
pub fn gradient_distance(q: &Quadric, p: &Point3) -> f64 {
    let f = q.eval(p);
    let g = q.gradient(p).norm();
    if g < 1e-12 {
        f.abs().sqrt()
    } else {
        f.abs() / g
    }
}

/// Exact distance from `p` to the zero set of `q`, or `None` if no real
/// stationary point could be recovered.
pub fn exact_distance(q: &Quadric, p: &Point3) -> Option<f64> {
    let eigen = SymmetricEigen::new(q.quadratic_form());
    let basis = eigen.eigenvectors;
    let lambda = eigen.eigenvalues;
    let beta = basis.transpose() * q.linear_terms();
    let local = basis.transpose() * p.coords;
    let k = q.constant();

    // d_i(s) = 1 + 2 s λ_i, n_i(s) = q_i - s β_i, ascending coefficients
    let d: Vec<[f64; 2]> = (0..3).map(|i| [1.0, 2.0 * lambda[i]]).collect();
    let n: Vec<[f64; 2]> = (0..3).map(|i| [local[i], -beta[i]]).collect();
    let d2: Vec<Vec<f64>> = d.iter().map(|di| mul(di, di)).collect();

    let mut poly = scale(&mul(&mul(&d2[0], &d2[1]), &d2[2]), k);
    for i in 0..3 {
        let others = (0..3)
            .filter(|&j| j != i)
            .fold(vec![1.0], |acc, j| mul(&acc, &d2[j]));
        let mut head = scale(&mul(&n[i], &n[i]), lambda[i]);
        add_into(&mut head, &scale(&mul(&n[i], &d[i]), beta[i]));
        add_into(&mut poly, &mul(&head, &others));
    }

    let highest_first: Vec<f64> = poly.iter().rev().copied().collect();
    let roots = real_roots(&highest_first)?;

    let scale_ref = 1.0 + q.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    let mut best: Option<f64> = None;
    for s in roots {
        let mut y = Vec3::zeros();
        let mut singular = false;
        for i in 0..3 {
            let den = 1.0 + 2.0 * s * lambda[i];
            if den.abs() < 1e-12 {
                singular = true;
                break;
            }
            y[i] = (local[i] - s * beta[i]) / den;
        }
        if singular {
            continue;
        }
        let x = Point3::from(basis * y);
        if q.eval(&x).abs() > 1e-6 * scale_ref * (1.0 + x.coords.norm_squared()) {
            continue;
        }
        let dist = (x - p).norm();
        if dist.is_finite() && best.map_or(true, |b| dist < b) {
            best = Some(dist);
        }
    }
    best
}

fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

fn scale(a: &[f64], k: f64) -> Vec<f64> {
    a.iter().map(|x| x * k).collect()
}

fn add_into(acc: &mut Vec<f64>, other: &[f64]) {
    if acc.len() < other.len() {
        acc.resize(other.len(), 0.0);
    }
    for (a, b) in acc.iter_mut().zip(other) {
        *a += b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quadcell_math::Mat3;

    fn sphere(r: f64) -> Quadric {
        Quadric::from_form(&Mat3::identity(), &Point3::origin(), -r * r)
    }

    #[test]
    fn test_exact_sphere() {
        let q = sphere(2.0);
        let d = exact_distance(&q, &Point3::new(5.0, 0.0, 0.0)).unwrap();
        assert!((d - 3.0).abs() < 1e-9);
        let inside = exact_distance(&q, &Point3::new(0.0, 0.5, 0.0)).unwrap();
        assert!((inside - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_exact_ellipsoid_beats_gradient() {
        // x²/9 + y² + z² = 1; nearest point to (5,0,0) is (3,0,0)
        let m = Mat3::from_diagonal(&Vec3::new(1.0 / 9.0, 1.0, 1.0));
        let q = Quadric::from_form(&m, &Point3::origin(), -1.0);
        let p = Point3::new(5.0, 0.0, 0.0);
        let exact = exact_distance(&q, &p).unwrap();
        assert_relative_eq!(exact, 2.0, epsilon = 1e-8);
        let estimate = gradient_distance(&q, &p);
        assert!((estimate - exact).abs() > 1e-3);
    }

    #[test]
    fn test_exact_plane() {
        let q = Quadric::plane(&Vec3::new(0.0, 0.0, 1.0), 1.0);
        let d = exact_distance(&q, &Point3::new(3.0, -2.0, 4.0)).unwrap();
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_centre_falls_back() {
        let q = sphere(1.5);
        let mut diag = Diagnostics::new();
        let d = DistanceSolver::Exact.distance_with(&q, &Point3::origin(), &mut diag);
        assert!((d - 1.5).abs() < 1e-9);
        assert_eq!(diag.count(DiagnosticKind::DistanceFallback), 1);
    }

    #[test]
    fn test_gradient_solver() {
        let q = sphere(1.0);
        let d = DistanceSolver::Gradient.distance(&q, &Point3::new(1.0 + 1e-4, 0.0, 0.0));
        assert!((d - 1e-4).abs() < 1e-7);
    }
}
