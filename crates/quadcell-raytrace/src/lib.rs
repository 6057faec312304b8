#![warn(missing_docs)]

//! Ray intersection with the surfaces of the quadcell CSG kernel.
//!
//! - [`Ray`] - origin and unit direction
//! - [`RayHit`] - a forward crossing of one surface
//! - [`intersect`] - per-primitive solvers and the [`intersect_surface`]
//!   dispatch
//!
//! Only crossings strictly ahead of the origin are reported, sorted by
//! distance, with numerically coincident roots merged.

mod ray;
pub mod intersect;

pub use intersect::intersect_surface;
pub use ray::{Ray, RayHit};
