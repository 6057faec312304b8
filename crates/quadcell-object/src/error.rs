//! Error type for cell construction and inlining.

use quadcell_geom::{GeometryError, ParseError};
use quadcell_rules::LookupError;
use thiserror::Error;

/// Errors from building or rewriting a cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    /// The cell text is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A surface or cell reference does not resolve.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The cell graph is inconsistent.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
