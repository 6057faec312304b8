//! Ray representation.

use quadcell_math::{Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized. Returns `None` for a zero direction.
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        Dir3::try_new(direction, 1e-12).map(|direction| Self { origin, direction })
    }

    /// Create a ray from an already normalized direction.
    pub fn from_unit(origin: Point3, direction: Dir3) -> Self {
        Self { origin, direction }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }
}

/// A forward crossing of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray.
    pub t: f64,
    /// Crossing point.
    pub point: Point3,
    /// Id of the surface crossed.
    pub surface: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)).unwrap();
        let p = ray.at(5.0);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 5.0).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_zero_direction() {
        assert!(Ray::new(Point3::origin(), Vec3::zeros()).is_none());
    }
}
