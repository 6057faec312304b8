//! Reference resolution errors.

use thiserror::Error;

/// A rule refers to a surface or cell that does not exist.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No surface with this id in the registry.
    #[error("surface {0} is not defined")]
    UnknownSurface(i32),

    /// No cell with this number.
    #[error("cell {0} is not defined")]
    UnknownCell(i32),
}
