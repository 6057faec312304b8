//! Ray-cone intersection (quadratic equation).

use quadcell_math::{solve_quadratic, Dir3, Point3};

use crate::Ray;

/// Intersect a ray with a double cone `ρ² = tan2 · h²`.
///
/// Both nappes count as the surface. A ray parallel to a generator leaves a
/// linear equation, which the quadratic solver handles.
pub fn intersect_cone(ray: &Ray, apex: &Point3, axis: &Dir3, tan2: f64) -> Vec<f64> {
    let a_dir = axis.as_ref();
    let d = ray.direction.as_ref();
    let co = ray.origin - apex;
    let k = 1.0 + tan2;

    let d_dot_a = d.dot(a_dir);
    let co_dot_a = co.dot(a_dir);

    // (p-apex)ᵀ (I - (1+tan²) a aᵀ) (p-apex) = 0 with p = o + t d
    let a = d.dot(d) - k * d_dot_a * d_dot_a;
    let b = 2.0 * (d.dot(&co) - k * d_dot_a * co_dot_a);
    let c = co.dot(&co) - k * co_dot_a * co_dot_a;
    solve_quadratic(a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_math::Vec3;

    #[test]
    fn test_ray_cone_both_nappes() {
        // 45 degree cone about z, crossed at height 2 where rho = 2
        let ray = Ray::new(Point3::new(-10.0, 0.0, 2.0), Vec3::x()).unwrap();
        let z = Dir3::new_normalize(Vec3::z());
        let roots = intersect_cone(&ray, &Point3::origin(), &z, 1.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 8.0).abs() < 1e-10);
        assert!((roots[1] - 12.0).abs() < 1e-10);

        let below = Ray::new(Point3::new(-10.0, 0.0, -2.0), Vec3::x()).unwrap();
        assert_eq!(intersect_cone(&below, &Point3::origin(), &z, 1.0).len(), 2);
    }

    #[test]
    fn test_ray_cone_parallel_to_generator() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0)).unwrap();
        let z = Dir3::new_normalize(Vec3::z());
        let roots = intersect_cone(&ray, &Point3::origin(), &z, 1.0);
        assert_eq!(roots.len(), 1);
        let p = ray.at(roots[0]);
        assert!((p.x.abs() - p.z.abs()).abs() < 1e-10);
    }
}
