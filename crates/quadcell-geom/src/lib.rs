#![warn(missing_docs)]

//! Quadric surface primitives for the quadcell CSG kernel.
//!
//! Surfaces are implicit equations `f(p) = 0` with the convention that
//! `f > 0` is outside. Planes, spheres, cylinders, cones and general
//! quadrics carry the ten coefficients of [`Quadric`]; the torus is quartic
//! and is evaluated from its parameters.
//!
//! Surfaces are created from compact text descriptors such as `"3 c/z 0 0 2"`
//! and serialize back to the most legible descriptor via `Display`.

pub mod diagnostics;
pub mod distance;
pub mod error;
pub mod quadric;
pub mod store;
pub mod surface;

pub use diagnostics::{DiagnosticKind, Diagnostics};
pub use distance::DistanceSolver;
pub use error::{GeometryError, ParseError};
pub use quadric::Quadric;
pub use store::{is_comment, SurfaceHandle, SurfaceRegistry, SurfaceStore};
pub use surface::{Shape, Side, Surface, SurfaceKind, SIDE_TOLERANCE};
