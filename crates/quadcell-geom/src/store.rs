//! Shared ownership of surfaces by id.

use std::collections::BTreeMap;
use std::sync::Arc;

use quadcell_math::Transform;

use crate::distance::DistanceSolver;
use crate::error::{GeometryError, ParseError};
use crate::surface::Surface;

/// A shared, immutable surface. Rule leaves and cells hold these.
pub type SurfaceHandle = Arc<Surface>;

/// Anything that can resolve a surface id.
pub trait SurfaceRegistry {
    /// The surface with this id, if defined.
    fn lookup(&self, id: i32) -> Option<SurfaceHandle>;
}

/// Surfaces keyed by id.
///
/// Handles given out by [`lookup`](SurfaceRegistry::lookup) are snapshots:
/// transforming a surface here does not move copies already bound into
/// cells until those cells are populated again.
#[derive(Debug, Clone, Default)]
pub struct SurfaceStore {
    surfaces: BTreeMap<i32, SurfaceHandle>,
}

impl SurfaceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a block of `"id tag params"` lines. Blank lines and lines
    /// starting with `c` followed by whitespace are comments.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut store = Self::new();
        for line in text.lines() {
            if is_comment(line) {
                continue;
            }
            store.insert(Surface::from_text(line)?);
        }
        Ok(store)
    }

    /// Parse one line and add it.
    pub fn add_from_text(&mut self, line: &str) -> Result<SurfaceHandle, ParseError> {
        let surface = Surface::from_text(line)?;
        Ok(self.insert(surface))
    }

    /// Add a surface, replacing any earlier one with the same id.
    pub fn insert(&mut self, surface: Surface) -> SurfaceHandle {
        let id = surface.id();
        let handle = Arc::new(surface);
        if self.surfaces.insert(id, handle.clone()).is_some() {
            tracing::warn!(id, "surface redefined");
        }
        handle
    }

    /// The surface with this id.
    pub fn get(&self, id: i32) -> Option<&Surface> {
        self.surfaces.get(&id).map(|s| s.as_ref())
    }

    /// Apply a transform to one surface. Returns `Ok(false)` if no surface
    /// has this id.
    pub fn transform_surface(&mut self, id: i32, t: &Transform) -> Result<bool, GeometryError> {
        match self.surfaces.get_mut(&id) {
            Some(handle) => {
                Arc::make_mut(handle).transform(t)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Use `solver` for every general quadric in the store.
    pub fn set_distance_solver(&mut self, solver: DistanceSolver) {
        for handle in self.surfaces.values_mut() {
            if handle.distance_solver() != solver {
                Arc::make_mut(handle).set_distance_solver(solver);
            }
        }
    }

    /// Use `tolerance` as the on-surface band of every surface in the store.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        for handle in self.surfaces.values_mut() {
            if handle.tolerance() != tolerance {
                Arc::make_mut(handle).set_tolerance(tolerance);
            }
        }
    }

    /// Number of surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// True if the store holds no surfaces.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Surfaces in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SurfaceHandle> + '_ {
        self.surfaces.values()
    }
}

impl SurfaceRegistry for SurfaceStore {
    fn lookup(&self, id: i32) -> Option<SurfaceHandle> {
        self.surfaces.get(&id).cloned()
    }
}

/// True for blank lines and `c` comment lines.
pub fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    if t.is_empty() {
        return true;
    }
    let mut chars = t.chars();
    matches!(chars.next(), Some('c' | 'C')) && chars.next().map_or(true, char::is_whitespace)
}
