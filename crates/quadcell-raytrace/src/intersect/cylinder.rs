//! Ray-cylinder intersection (quadratic equation).

use quadcell_math::{solve_quadratic, Dir3, Point3};

use crate::Ray;

/// Intersect a ray with an infinite cylinder.
///
/// Works in the plane perpendicular to the axis. A ray parallel to the axis
/// has no crossings.
pub fn intersect_cylinder(ray: &Ray, centre: &Point3, axis: &Dir3, radius: f64) -> Vec<f64> {
    let a_dir = axis.as_ref();
    let oc = ray.origin - centre;
    let d = ray.direction.as_ref();

    // Remove the axial component
    let d_perp = d - d.dot(a_dir) * a_dir;
    let oc_perp = oc - oc.dot(a_dir) * a_dir;

    let a = d_perp.dot(&d_perp);
    if a < 1e-14 {
        return Vec::new();
    }
    let b = 2.0 * oc_perp.dot(&d_perp);
    let c = oc_perp.dot(&oc_perp) - radius * radius;
    solve_quadratic(a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_math::Vec3;

    #[test]
    fn test_ray_cylinder_perpendicular() {
        let ray = Ray::new(Point3::new(-10.0, 0.0, 5.0), Vec3::x()).unwrap();
        let z = Dir3::new_normalize(Vec3::z());
        let roots = intersect_cylinder(&ray, &Point3::origin(), &z, 3.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 7.0).abs() < 1e-10);
        assert!((roots[1] - 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_cylinder_parallel_to_axis() {
        let ray = Ray::new(Point3::new(1.0, 0.0, -5.0), Vec3::z()).unwrap();
        let z = Dir3::new_normalize(Vec3::z());
        assert!(intersect_cylinder(&ray, &Point3::origin(), &z, 3.0).is_empty());
    }
}
