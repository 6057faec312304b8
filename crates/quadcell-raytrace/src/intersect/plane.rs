//! Ray-plane intersection (closed-form).

use quadcell_math::Dir3;

use crate::Ray;

/// Intersect a ray with the plane `normal · p = distance`.
///
/// Returns `None` if the ray is parallel to the plane.
pub fn intersect_plane(ray: &Ray, normal: &Dir3, distance: f64) -> Option<f64> {
    let denom = ray.direction.dot(normal.as_ref());

    // Ray is parallel to plane
    if denom.abs() < 1e-12 {
        return None;
    }

    Some((distance - ray.origin.coords.dot(normal.as_ref())) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_math::{Point3, Vec3};

    #[test]
    fn test_ray_plane_perpendicular() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let t = intersect_plane(&ray, &Dir3::new_normalize(Vec3::z()), 0.0).unwrap();
        assert!((t - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_plane_oblique() {
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 1.0, 0.0)).unwrap();
        let t = intersect_plane(&ray, &Dir3::new_normalize(Vec3::x()), 2.0).unwrap();
        let p = ray.at(t);
        assert!((p.x - 2.0).abs() < 1e-10);
        assert!((p.y - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_plane_parallel() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::x()).unwrap();
        assert!(intersect_plane(&ray, &Dir3::new_normalize(Vec3::z()), 0.0).is_none());
    }
}
