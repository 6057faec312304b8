//! Ray-torus intersection (quartic equation).

use quadcell_math::{solve_quartic, Dir3, Point3};

use crate::Ray;

/// Intersect a ray with a torus.
///
/// Returns up to 4 roots in increasing order.
pub fn intersect_torus(ray: &Ray, centre: &Point3, axis: &Dir3, major: f64, minor: f64) -> Vec<f64> {
    let r2 = major * major;
    let a2 = minor * minor;

    let a_dir = axis.as_ref();
    let d = ray.direction.as_ref();
    let o = ray.origin - centre;

    let od = o.dot(d);
    let oo = o.dot(&o);
    let dd = d.dot(d);

    // Height along axis
    let oa = o.dot(a_dir);
    let da = d.dot(a_dir);

    // (|p|² + R² - r²)² = 4R²(|p|² - (p·a)²) expanded in t
    let k = oo - (r2 + a2);
    let c4 = dd * dd;
    let c3 = 4.0 * dd * od;
    let c2 = 2.0 * dd * k + 4.0 * od * od + 4.0 * r2 * da * da;
    let c1 = 4.0 * k * od + 8.0 * r2 * oa * da;
    let c0 = k * k - 4.0 * r2 * (a2 - oa * oa);

    solve_quartic(c4, c3, c2, c1, c0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quadcell_math::Vec3;

    fn z_axis() -> Dir3 {
        Dir3::new_normalize(Vec3::z())
    }

    #[test]
    fn test_ray_torus_four_hits() {
        // R = 10, r = 3 about z; the x axis crosses at ±7 and ±13
        let ray = Ray::new(Point3::new(-20.0, 0.0, 0.0), Vec3::x()).unwrap();
        let roots = intersect_torus(&ray, &Point3::origin(), &z_axis(), 10.0, 3.0);
        assert_eq!(roots.len(), 4);
        for (t, x) in roots.iter().zip([-13.0, -7.0, 7.0, 13.0]) {
            assert_relative_eq!(ray.at(*t).x, x, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_ray_torus_through_hole() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::z()).unwrap();
        assert!(intersect_torus(&ray, &Point3::origin(), &z_axis(), 10.0, 3.0).is_empty());
    }

    #[test]
    fn test_ray_torus_top() {
        // Straight down through the tube centre at (10, 0, 0)
        let ray = Ray::new(Point3::new(10.0, 0.0, 10.0), -Vec3::z()).unwrap();
        let roots = intersect_torus(&ray, &Point3::origin(), &z_axis(), 10.0, 3.0);
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], 7.0, epsilon = 1e-8);
        assert_relative_eq!(roots[1], 13.0, epsilon = 1e-8);
    }
}
