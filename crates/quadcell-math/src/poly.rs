//! Real polynomial root solvers.
//!
//! Closed forms up to degree four (stable quadratic, Cardano, Ferrari) and a
//! companion-matrix solver for higher degrees. Every solver returns the real
//! roots sorted in ascending order with near-duplicates merged.

use nalgebra::DMatrix;
use std::f64::consts::PI;

const EPS: f64 = 1e-12;

/// Roots closer than this (relative to their magnitude) are merged.
const MERGE: f64 = 1e-10;

/// Solve `a*x^2 + b*x + c = 0`.
///
/// Uses the cancellation-free form `q = -(b + sign(b) sqrt(disc)) / 2`.
/// A discriminant that is negative only by rounding is treated as a double
/// root, so tangent rays still report their touching point.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < EPS {
        // Linear
        if b.abs() > EPS {
            return vec![-c / b];
        }
        return Vec::new();
    }

    let disc = b * b - 4.0 * a * c;
    let scale = (b * b).max((4.0 * a * c).abs());
    if disc < -EPS * scale.max(1.0) {
        return Vec::new();
    }
    if disc <= EPS * scale.max(1.0) {
        return vec![-b / (2.0 * a)];
    }

    let sqrt_disc = disc.sqrt();
    let q = -0.5 * (b + b.signum() * sqrt_disc);
    let mut roots = vec![q / a];
    if q != 0.0 {
        roots.push(c / q);
    }
    finish(roots)
}

/// Solve `a*x^3 + b*x^2 + c*x + d = 0`.
///
/// Uses Cardano's formula, with the trigonometric form for three real roots.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < EPS {
        // Degenerate to quadratic
        return solve_quadratic(b, c, d);
    }

    // Normalize: x^3 + px^2 + qx + r = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;

    // Depressed cubic via substitution x = t - p/3: t^3 + aa t + bb = 0
    let p2 = p * p;
    let aa = q - p2 / 3.0;
    let bb = r - p * q / 3.0 + 2.0 * p2 * p / 27.0;

    let delta = bb * bb / 4.0 + aa * aa * aa / 27.0;

    let mut roots = Vec::new();
    let shift = p / 3.0;

    if delta > EPS {
        // One real root
        let sqrt_delta = delta.sqrt();
        let u = (-bb / 2.0 + sqrt_delta).cbrt();
        let v = (-bb / 2.0 - sqrt_delta).cbrt();
        roots.push(u + v - shift);
    } else if delta.abs() <= EPS {
        if aa.abs() < EPS && bb.abs() < EPS {
            // Triple root
            roots.push(-shift);
        } else {
            // Double root
            let u = (-bb / 2.0).cbrt();
            roots.push(2.0 * u - shift);
            roots.push(-u - shift);
        }
    } else {
        // Three real roots (Vieta's trigonometric solution)
        let m = 2.0 * (-aa / 3.0).sqrt();
        let theta = (3.0 * bb / (aa * m)).clamp(-1.0, 1.0).acos() / 3.0;

        roots.push(m * theta.cos() - shift);
        roots.push(m * (theta - 2.0 * PI / 3.0).cos() - shift);
        roots.push(m * (theta + 2.0 * PI / 3.0).cos() - shift);
    }

    let coeffs = [a, b, c, d];
    finish(roots.into_iter().map(|x| polish(&coeffs, x)).collect())
}

/// Solve `a*x^4 + b*x^3 + c*x^2 + d*x + e = 0`.
///
/// Uses Ferrari's method via a resolvent cubic, then refines each root with
/// a few Newton steps on the original polynomial.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    if a.abs() < EPS {
        // Degenerate to cubic
        return solve_cubic(b, c, d, e);
    }

    // Normalize: x^4 + px^3 + qx^2 + rx + s = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;
    let s = e / a;

    // Depressed quartic via substitution x = y - p/4
    let p2 = p * p;
    let p3 = p2 * p;
    let p4 = p2 * p2;

    let a2 = q - 3.0 * p2 / 8.0;
    let a1 = r - p * q / 2.0 + p3 / 8.0;
    let a0 = s - p * r / 4.0 + p2 * q / 16.0 - 3.0 * p4 / 256.0;

    // Resolvent cubic: 8u^3 + 8*a2*u^2 + (2*a2^2 - 8*a0)*u - a1^2 = 0
    let cubic_roots = solve_cubic(8.0, 8.0 * a2, 2.0 * a2 * a2 - 8.0 * a0, -a1 * a1);

    // Largest positive root gives the best conditioned factorisation
    let u = cubic_roots
        .into_iter()
        .filter(|&u| u > EPS)
        .fold(0.0_f64, f64::max);

    let sqrt_2u = (2.0 * u).max(0.0).sqrt();

    let mut roots = Vec::new();

    if sqrt_2u > EPS {
        // Two quadratics
        let alpha = a2 + 2.0 * u;
        let beta = a1 / sqrt_2u;

        // y^2 + sqrt(2u)*y + (alpha - beta)/2 = 0
        for y in solve_quadratic(1.0, sqrt_2u, (alpha - beta) / 2.0) {
            roots.push(y - p / 4.0);
        }
        // y^2 - sqrt(2u)*y + (alpha + beta)/2 = 0
        for y in solve_quadratic(1.0, -sqrt_2u, (alpha + beta) / 2.0) {
            roots.push(y - p / 4.0);
        }
    } else {
        // Biquadratic: y^4 + a2*y^2 + a0 = 0
        for y2 in solve_quadratic(1.0, a2, a0) {
            if y2 >= 0.0 {
                let y = y2.sqrt();
                roots.push(y - p / 4.0);
                roots.push(-y - p / 4.0);
            } else if y2 > -EPS {
                roots.push(-p / 4.0);
            }
        }
    }

    let coeffs = [a, b, c, d, e];
    finish(roots.into_iter().map(|x| polish(&coeffs, x)).collect())
}

/// Real roots of a polynomial of any degree.
///
/// `coeffs` are ordered from the highest power down to the constant term.
/// Leading coefficients that vanish are dropped; degrees up to two use the
/// closed form, higher degrees use the eigenvalues of the companion matrix.
/// Returns `None` if the eigenvalue computation produced non-finite values.
pub fn real_roots(coeffs: &[f64]) -> Option<Vec<f64>> {
    let scale = coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let lead = coeffs.iter().position(|c| c.abs() > EPS * scale)?;
    let poly = &coeffs[lead..];
    let degree = poly.len() - 1;

    match degree {
        0 => return Some(Vec::new()),
        1 => return Some(vec![-poly[1] / poly[0]]),
        2 => return Some(solve_quadratic(poly[0], poly[1], poly[2])),
        _ => {}
    }

    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    for (i, c) in poly[1..].iter().enumerate() {
        companion[(0, i)] = -c / poly[0];
    }

    let eigen = companion.complex_eigenvalues();
    let mut roots = Vec::new();
    for z in eigen.iter() {
        if !z.re.is_finite() || !z.im.is_finite() {
            return None;
        }
        if z.im.abs() <= 1e-7 * (1.0 + z.re.abs()) {
            roots.push(polish(poly, z.re));
        }
    }
    Some(finish(roots))
}

/// Evaluate a polynomial (highest power first) with Horner's scheme,
/// returning the value and the derivative.
pub fn horner(coeffs: &[f64], x: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut deriv = 0.0;
    for &c in coeffs {
        deriv = deriv * x + value;
        value = value * x + c;
    }
    (value, deriv)
}

/// A few Newton steps; keeps the original estimate if they do not help.
fn polish(coeffs: &[f64], x0: f64) -> f64 {
    let mut x = x0;
    let (mut fx, _) = horner(coeffs, x);
    for _ in 0..4 {
        let (f, df) = horner(coeffs, x);
        if df.abs() < EPS || f == 0.0 {
            break;
        }
        let next = x - f / df;
        let (f_next, _) = horner(coeffs, next);
        if !next.is_finite() || f_next.abs() > fx.abs() {
            break;
        }
        x = next;
        fx = f_next;
    }
    x
}

fn finish(mut roots: Vec<f64>) -> Vec<f64> {
    roots.retain(|r| r.is_finite());
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() <= MERGE * (1.0 + b.abs()));
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_quadratic() {
        let roots = solve_quadratic(1.0, -3.0, 2.0); // (x-1)(x-2) = 0
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1.0).abs() < 1e-12);
        assert!((roots[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_quadratic_cancellation() {
        // Roots 1e-8 and 1e8: the naive formula loses the small one
        let roots = solve_quadratic(1.0, -(1e8 + 1e-8), 1.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1e-8).abs() < 1e-20);
        assert!((roots[1] - 1e8).abs() < 1e-4);
    }

    #[test]
    fn test_solve_quadratic_double_root() {
        let roots = solve_quadratic(1.0, -2.0, 1.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 1.0).abs() < 1e-12);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_solve_cubic() {
        // (x-1)(x-2)(x-3) = x^3 - 6x^2 + 11x - 6
        let roots = solve_cubic(1.0, -6.0, 11.0, -6.0);
        assert_eq!(roots.len(), 3);
        for (r, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((r - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_solve_quartic() {
        // (x+13)(x+7)(x-7)(x-13) = x^4 - 218x^2 + 8281
        let roots = solve_quartic(1.0, 0.0, -218.0, 0.0, 8281.0);
        assert_eq!(roots.len(), 4);
        for (r, expected) in roots.iter().zip([-13.0, -7.0, 7.0, 13.0]) {
            assert!((r - expected).abs() < 1e-8, "{r} vs {expected}");
        }
    }

    #[test]
    fn test_solve_quartic_shifted() {
        // (x-1)(x-2)(x-4)(x-5) = x^4 - 12x^3 + 49x^2 - 78x + 40
        let roots = solve_quartic(1.0, -12.0, 49.0, -78.0, 40.0);
        assert_eq!(roots.len(), 4);
        for (r, expected) in roots.iter().zip([1.0, 2.0, 4.0, 5.0]) {
            assert!((r - expected).abs() < 1e-8, "{r} vs {expected}");
        }
    }

    #[test]
    fn test_real_roots_sextic() {
        // (x^2-1)(x^2-4)(x^2+1) = x^6 - 4x^4 - x^2 + 4
        let roots = real_roots(&[1.0, 0.0, -4.0, 0.0, -1.0, 0.0, 4.0]).unwrap();
        assert_eq!(roots.len(), 4);
        for (r, expected) in roots.iter().zip([-2.0, -1.0, 1.0, 2.0]) {
            assert!((r - expected).abs() < 1e-8, "{r} vs {expected}");
        }
    }

    #[test]
    fn test_real_roots_leading_zeros() {
        let roots = real_roots(&[0.0, 0.0, 1.0, -3.0, 2.0]).unwrap();
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1.0).abs() < 1e-12);
        assert!(real_roots(&[0.0, 0.0]).is_none());
    }

    #[test]
    fn test_horner() {
        let (v, d) = horner(&[2.0, -3.0, 1.0], 2.0); // 2x^2 - 3x + 1
        assert!((v - 3.0).abs() < 1e-12);
        assert!((d - 5.0).abs() < 1e-12);
    }
}
