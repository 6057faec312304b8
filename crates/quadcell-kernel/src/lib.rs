#![warn(missing_docs)]

//! Multi-cell geometry for the quadcell CSG kernel.
//!
//! A [`GeometryManager`] holds the cells of a partitioned space together with
//! an index from surfaces to the cells they bound. It locates points and
//! traces rays across cells, producing a [`Track`] of per-cell spans that
//! [`integrate_attenuation`] turns into a transmitted fraction.
//!
//! # Example
//!
//! ```ignore
//! use quadcell_kernel::{GeometryDeck, TraceSettings};
//!
//! let manager = GeometryDeck::parse(&text)?.into_manager(&TraceSettings::default())?;
//! let track = manager.trace_ray(origin, direction)?;
//! for link in track.links() {
//!     println!("cell {} for {:.3}", link.cell, link.length());
//! }
//! ```

pub mod attenuation;
pub mod config;
pub mod deck;
pub mod error;
pub mod manager;

pub use attenuation::{integrate_attenuation, MaterialLibrary, MaterialTable, NeutronMaterial};
pub use config::TraceSettings;
pub use deck::GeometryDeck;
pub use error::{Error, Result};
pub use manager::{CellId, GeometryManager};

pub use quadcell_geom::{Diagnostics, DiagnosticKind, GeometryError, SurfaceStore};
pub use quadcell_object::{Crossing, CrossingKind, Link, Object, Track};
pub use quadcell_raytrace::Ray;
