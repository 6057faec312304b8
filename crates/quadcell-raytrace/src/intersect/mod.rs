//! Ray-surface intersection algorithms.
//!
//! Each surface type has a dedicated solver returning candidate ray
//! parameters; [`intersect_surface`] filters them to the forward direction,
//! orders them and merges near-duplicates.

mod cone;
mod cylinder;
mod plane;
mod quadric;
mod sphere;
mod torus;

pub use cone::intersect_cone;
pub use cylinder::intersect_cylinder;
pub use plane::intersect_plane;
pub use quadric::intersect_quadric;
pub use sphere::intersect_sphere;
pub use torus::intersect_torus;

use quadcell_geom::{Shape, Surface};

use crate::{Ray, RayHit};

/// Smallest ray parameter counted as ahead of the origin.
pub const MIN_T: f64 = 1e-10;

/// Roots closer than this are reported once.
pub const MERGE_T: f64 = 1e-9;

/// Intersect a ray with a surface, returning forward crossings sorted by `t`.
pub fn intersect_surface(ray: &Ray, surface: &Surface) -> Vec<RayHit> {
    let roots = match surface.shape() {
        Shape::Plane { normal, distance } => intersect_plane(ray, normal, *distance)
            .into_iter()
            .collect(),
        Shape::Sphere { centre, radius } => intersect_sphere(ray, centre, *radius),
        Shape::Cylinder { centre, axis, radius } => intersect_cylinder(ray, centre, axis, *radius),
        Shape::Cone { apex, axis, tan2 } => intersect_cone(ray, apex, axis, *tan2),
        Shape::Torus {
            centre,
            axis,
            major,
            minor,
        } => intersect_torus(ray, centre, axis, *major, *minor),
        Shape::General => intersect_quadric(ray, surface.quadric()),
    };
    forward_hits(ray, surface.id(), roots)
}

fn forward_hits(ray: &Ray, surface: i32, mut roots: Vec<f64>) -> Vec<RayHit> {
    roots.retain(|t| t.is_finite() && *t > MIN_T);
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|later, earlier| (*later - *earlier).abs() <= MERGE_T * (1.0 + earlier.abs()));
    roots
        .into_iter()
        .map(|t| RayHit {
            t,
            point: ray.at(t),
            surface,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_math::{Point3, Vec3};

    fn ray(o: [f64; 3], d: [f64; 3]) -> Ray {
        Ray::new(Point3::new(o[0], o[1], o[2]), Vec3::new(d[0], d[1], d[2])).unwrap()
    }

    #[test]
    fn test_unit_sphere_entry_exit() {
        let sphere = Surface::from_text("1 so 1").unwrap();
        let hits = intersect_surface(&ray([-5.0, 0.0, 0.0], [1.0, 0.0, 0.0]), &sphere);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].point.x + 1.0).abs() < 1e-12);
        assert!((hits[1].point.x - 1.0).abs() < 1e-12);
        assert_eq!(hits[0].surface, 1);
    }

    #[test]
    fn test_behind_origin_dropped() {
        let sphere = Surface::from_text("1 so 1").unwrap();
        let hits = intersect_surface(&ray([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]), &sphere);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t - 1.0).abs() < 1e-12);

        let plane = Surface::from_text("2 px -1").unwrap();
        assert!(intersect_surface(&ray([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]), &plane).is_empty());
    }

    #[test]
    fn test_tangent_collapses() {
        let sphere = Surface::from_text("1 so 1").unwrap();
        let hits = intersect_surface(&ray([-5.0, 1.0, 0.0], [1.0, 0.0, 0.0]), &sphere);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].point.x.abs() < 1e-6);
    }

    #[test]
    fn test_general_matches_sphere() {
        let sphere = Surface::from_text("1 s 1 2 0 3").unwrap();
        let general = Surface::general(1, *sphere.quadric()).unwrap();
        let r = ray([-7.0, 0.5, 0.2], [1.0, 0.3, -0.1]);
        let a = intersect_surface(&r, &sphere);
        let b = intersect_surface(&r, &general);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x.t - y.t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_every_kind_hits_its_surface() {
        let r = ray([-20.0, 0.1, 0.2], [1.0, 0.001, 0.02]);
        for text in [
            "1 p 1 1 0 2",
            "2 s 0 0 0 4",
            "3 c/z 0 0 2",
            "4 kz 0 1",
            "5 t/z 0 0 0 6 1",
            "6 gq 1 0.5 0.25 0 0 0 0 0 0 -9",
        ] {
            let surface = Surface::from_text(text).unwrap();
            let hits = intersect_surface(&r, &surface);
            assert!(!hits.is_empty(), "{text}");
            for hit in hits {
                assert!(surface.distance(&hit.point) < 1e-8, "{text}");
            }
        }
    }
}
