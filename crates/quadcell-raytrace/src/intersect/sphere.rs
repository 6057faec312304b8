//! Ray-sphere intersection (quadratic equation).

use quadcell_math::{solve_quadratic, Point3};

use crate::Ray;

/// Intersect a ray with a sphere.
///
/// Returns the real roots of `|o + t d - c|² = r²` in increasing order,
/// including those behind the origin.
pub fn intersect_sphere(ray: &Ray, centre: &Point3, radius: f64) -> Vec<f64> {
    let oc = ray.origin - centre;
    let d = ray.direction.as_ref();

    let b = 2.0 * oc.dot(d);
    let c = oc.dot(&oc) - radius * radius;
    solve_quadratic(1.0, b, c)
}
