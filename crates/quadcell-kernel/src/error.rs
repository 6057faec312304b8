//! Error types for the geometry manager.

use quadcell_geom::{GeometryError, ParseError};
use quadcell_object::CellError;
use quadcell_rules::LookupError;
use thiserror::Error;

/// Errors from building or configuring a geometry.
#[derive(Error, Debug)]
pub enum Error {
    /// Surface or cell text is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A surface or cell reference does not resolve.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The geometry is inconsistent.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Trace settings are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The settings file is not valid TOML for [`TraceSettings`](crate::TraceSettings).
    #[error("malformed settings: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<CellError> for Error {
    fn from(e: CellError) -> Self {
        match e {
            CellError::Parse(e) => Self::Parse(e),
            CellError::Lookup(e) => Self::Lookup(e),
            CellError::Geometry(e) => Self::Geometry(e),
        }
    }
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;
