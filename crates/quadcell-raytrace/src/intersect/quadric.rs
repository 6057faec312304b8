//! Ray intersection with a general quadric by substitution.

use quadcell_geom::Quadric;
use quadcell_math::solve_quadratic;

use crate::Ray;

/// Intersect a ray with the zero set of `q`.
///
/// Substituting `p = o + t d` gives `t² dᵀAd + t ∇f(o)·d + f(o) = 0`.
pub fn intersect_quadric(ray: &Ray, q: &Quadric) -> Vec<f64> {
    let d = ray.direction.as_ref();
    let a = d.dot(&(q.quadratic_form() * d));
    let b = q.gradient(&ray.origin).dot(d);
    let c = q.eval(&ray.origin);
    solve_quadratic(a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_math::{Point3, Vec3};

    #[test]
    fn test_ray_hyperboloid() {
        // x² + y² - z² - 1 = 0, a one-sheet hyperboloid
        let q = Quadric::new([1.0, 1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        let ray = Ray::new(Point3::new(-5.0, 0.0, 1.0), Vec3::x()).unwrap();
        let roots = intersect_quadric(&ray, &q);
        let r = 2.0_f64.sqrt();
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - (5.0 - r)).abs() < 1e-10);
        assert!((roots[1] - (5.0 + r)).abs() < 1e-10);
    }

    #[test]
    fn test_ray_planar_quadric() {
        let q = Quadric::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, -4.0]);
        let ray = Ray::new(Point3::origin(), Vec3::y()).unwrap();
        let roots = intersect_quadric(&ray, &q);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2.0).abs() < 1e-12);
    }
}
