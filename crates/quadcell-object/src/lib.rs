#![warn(missing_docs)]

//! CSG cells for the quadcell kernel.
//!
//! An [`Object`] is one cell: a rule tree over surface half-spaces plus the
//! material that fills it. Cells answer point containment, boundary tests
//! and ray interception; interception records [`Crossing`]s into a
//! [`Track`], which links them into per-cell [`Link`] spans.

pub mod error;
mod object;
mod track;

pub use error::CellError;
pub use object::{Object, Probe};
pub use track::{Crossing, CrossingKind, Link, Track};
