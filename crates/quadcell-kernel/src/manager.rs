//! The multi-cell geometry and its ray tracer.

use std::collections::{BTreeMap, VecDeque};

use quadcell_geom::{Diagnostics, GeometryError, SurfaceHandle, SurfaceRegistry};
use quadcell_math::{Dir3, Point3};
use quadcell_object::{Object, Probe, Track};
use quadcell_raytrace::Ray;
use quadcell_rules::{CellLookup, LookupError, Resolver, RuleTree, DEFAULT_MAX_DEPTH};
use rayon::prelude::*;

use crate::config::TraceSettings;
use crate::error::Result;

/// Index of a cell in insertion order.
pub type CellId = usize;

/// An ordered collection of cells with a surface-to-cell adjacency index.
///
/// Cells are added, populated and inlined through `&mut self`; the index is
/// then built once and tracing runs through `&self`. Any mutation marks the
/// index stale and tracing refuses to run until it is rebuilt.
#[derive(Debug, Clone)]
pub struct GeometryManager {
    cells: Vec<Object>,
    numbers: BTreeMap<i32, CellId>,
    adjacency: BTreeMap<i32, Vec<CellId>>,
    indexed: bool,
    max_depth: usize,
    probe: Probe,
}

impl Default for GeometryManager {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            numbers: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            indexed: false,
            max_depth: DEFAULT_MAX_DEPTH,
            probe: Probe::default(),
        }
    }
}

// =============================================================================
// Building
// =============================================================================

impl GeometryManager {
    /// An empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty geometry using `settings` for probes and complement depth.
    pub fn with_settings(settings: &TraceSettings) -> Self {
        let mut manager = Self::new();
        manager.apply_settings(settings);
        manager
    }

    /// Apply probe steps and the complement depth to every cell, present and
    /// future.
    pub fn apply_settings(&mut self, settings: &TraceSettings) {
        self.max_depth = settings.max_complement_depth;
        self.probe = settings.probe();
        for cell in &mut self.cells {
            cell.set_probe(self.probe);
        }
    }

    /// Append a cell. Its id is its position in insertion order.
    pub fn add_object(&mut self, mut object: Object) -> std::result::Result<CellId, GeometryError> {
        let number = object.number();
        if self.numbers.contains_key(&number) {
            return Err(GeometryError::DuplicateCell(number));
        }
        object.set_probe(self.probe);
        let id = self.cells.len();
        self.cells.push(object);
        self.numbers.insert(number, id);
        self.indexed = false;
        tracing::debug!(cell = number, id, "cell added");
        Ok(id)
    }

    /// Bind surfaces in every cell.
    pub fn populate(&mut self, registry: &dyn SurfaceRegistry) -> std::result::Result<(), LookupError> {
        for cell in &mut self.cells {
            cell.populate(registry)?;
        }
        self.indexed = false;
        Ok(())
    }

    /// Replace every `#N` in every cell by the complemented rules of cell
    /// `N`.
    pub fn inline_referenced_cells(&mut self) -> Result<()> {
        let snapshot: BTreeMap<i32, RuleTree> = self
            .cells
            .iter()
            .map(|c| (c.number(), c.rules().clone()))
            .collect();
        for cell in &mut self.cells {
            cell.inline_referenced_cells(&snapshot)?;
        }
        self.indexed = false;
        Ok(())
    }

    /// Check complement references, rebuild every cell's surface list and
    /// the surface-to-cell index.
    pub fn build_adjacency_index(&mut self) -> Result<()> {
        self.check_complements()?;

        self.adjacency.clear();
        for (id, cell) in self.cells.iter_mut().enumerate() {
            if cell.has_complement() {
                tracing::warn!(
                    cell = cell.number(),
                    "cell refers to other cells; crossings of their surfaces are only traced after inlining"
                );
            }
            for surface in cell.create_surface_list() {
                self.adjacency.entry(surface.id()).or_default().push(id);
            }
        }
        self.indexed = true;
        tracing::debug!(
            cells = self.cells.len(),
            surfaces = self.adjacency.len(),
            "adjacency index built"
        );
        Ok(())
    }

    /// Every `#N` must name an existing cell and no chain of references may
    /// lead back to its start.
    fn check_complements(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unseen,
            Active,
            Done,
        }

        fn visit(manager: &GeometryManager, id: CellId, marks: &mut [Mark]) -> Result<()> {
            marks[id] = Mark::Active;
            for (_, number) in manager.cells[id].rules().object_complements() {
                let next = manager.id_of(number).ok_or(LookupError::UnknownCell(number))?;
                match marks[next] {
                    Mark::Active => return Err(GeometryError::CyclicComplement(number).into()),
                    Mark::Unseen => visit(manager, next, marks)?,
                    Mark::Done => {}
                }
            }
            marks[id] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unseen; self.cells.len()];
        for id in 0..self.cells.len() {
            if marks[id] == Mark::Unseen {
                visit(self, id, &mut marks)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Queries
// =============================================================================

impl GeometryManager {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if there are no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell with this id.
    pub fn cell(&self, id: CellId) -> Option<&Object> {
        self.cells.get(id)
    }

    /// The id of the cell with this number.
    pub fn id_of(&self, number: i32) -> Option<CellId> {
        self.numbers.get(&number).copied()
    }

    /// Cells in id order.
    pub fn cells(&self) -> impl Iterator<Item = &Object> + '_ {
        self.cells.iter()
    }

    /// True if the adjacency index reflects the current cells.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Ids of the cells bounded by surface `id`.
    pub fn cells_on_surface(&self, id: i32) -> &[CellId] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolver for `#N` references through this geometry.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self).with_max_depth(self.max_depth)
    }

    /// The cell containing `p`, trying `hint` first, then every cell in id
    /// order. `None` is vacuum.
    pub fn locate_cell(&self, p: &Point3, hint: Option<CellId>) -> Option<CellId> {
        self.locate_cell_with(p, hint, &mut Diagnostics::new())
    }

    fn locate_cell_with(&self, p: &Point3, hint: Option<CellId>, diagnostics: &mut Diagnostics) -> Option<CellId> {
        let resolver = self.resolver();
        if let Some(id) = hint {
            if self
                .cells
                .get(id)
                .is_some_and(|c| c.is_valid_in(p, &resolver, diagnostics))
            {
                return Some(id);
            }
        }
        (0..self.cells.len()).find(|&id| self.cells[id].is_valid_in(p, &resolver, diagnostics))
    }

    /// Nearest surface to `p` over all cells, with its distance.
    pub fn nearest_boundary(&self, p: &Point3) -> Option<(i32, f64)> {
        let mut best: Option<(i32, f64)> = None;
        for cell in &self.cells {
            let fresh;
            let surfaces: &[SurfaceHandle] = if cell.is_stale() {
                fresh = cell.rules().surfaces();
                &fresh
            } else {
                cell.surfaces()
            };
            for surface in surfaces {
                let d = surface.distance(p);
                if best.map_or(true, |(_, b)| d < b) {
                    best = Some((surface.id(), d));
                }
            }
        }
        best
    }
}

impl CellLookup for GeometryManager {
    fn rules(&self, number: i32) -> Option<&RuleTree> {
        self.id_of(number).map(|id| self.cells[id].rules())
    }
}

// =============================================================================
// Tracing
// =============================================================================

impl GeometryManager {
    /// Trace a ray from `origin` along `direction`.
    pub fn trace_ray(&self, origin: Point3, direction: Dir3) -> std::result::Result<Track, GeometryError> {
        self.trace_ray_with(&Ray::from_unit(origin, direction), &mut Diagnostics::new())
    }

    /// Trace `ray` through the geometry and link its crossings into spans.
    ///
    /// The search starts from the cell the ray runs through just past its
    /// origin (or from every cell when that point is in vacuum) and spreads
    /// to the cells sharing each surface the ray crosses. An origin on a
    /// shared surface therefore starts in the cell ahead of it.
    pub fn trace_ray_with(
        &self,
        ray: &Ray,
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<Track, GeometryError> {
        if !self.indexed {
            return Err(GeometryError::StaleIndex);
        }
        let resolver = self.resolver();
        let mut track = Track::new(ray);
        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();

        let start = ray.at(self.probe.crossing_step);
        match self.locate_cell_with(&start, None, diagnostics) {
            Some(id) => {
                let cell = &self.cells[id];
                track.set_start_cell(cell.number(), cell.material());
                visited[id] = true;
                queue.push_back(id);
            }
            None => {
                visited.fill(true);
                queue.extend(0..self.cells.len());
            }
        }

        while let Some(id) = queue.pop_front() {
            let crossed = self.cells[id].intercept_surface_in(ray, &mut track, &resolver, diagnostics);
            for surface in crossed {
                for &next in self.cells_on_surface(surface) {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        track.finalize(diagnostics);
        Ok(track)
    }

    /// Trace many rays in parallel. Diagnostics from every ray are merged
    /// into `diagnostics`.
    pub fn trace_rays(
        &self,
        rays: &[Ray],
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<Vec<Track>, GeometryError> {
        if !self.indexed {
            return Err(GeometryError::StaleIndex);
        }
        let traced: Vec<(Track, Diagnostics)> = rays
            .par_iter()
            .map(|ray| {
                let mut local = Diagnostics::new();
                self.trace_ray_with(ray, &mut local).map(|track| (track, local))
            })
            .collect::<std::result::Result<_, _>>()?;

        let mut tracks = Vec::with_capacity(traced.len());
        for (track, local) in traced {
            diagnostics.merge(&local);
            tracks.push(track);
        }
        Ok(tracks)
    }
}
