//! A single CSG cell.

use std::borrow::Cow;
use std::fmt;

use quadcell_geom::{
    DiagnosticKind, Diagnostics, GeometryError, ParseError, SurfaceHandle, SurfaceRegistry,
};
use quadcell_math::{Point3, Tolerance, Vec3};
use quadcell_raytrace::{intersect_surface, Ray};
use quadcell_rules::{CellLookup, LookupError, Resolver, Rule, RuleTree};

use crate::error::CellError;
use crate::track::{Crossing, CrossingKind, Track};

/// Step sizes used to probe validity around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Offset along surface normals for the boundary test.
    pub boundary_step: f64,
    /// Offset along the ray for entry/exit classification.
    pub crossing_step: f64,
}

impl Probe {
    /// Steps of 5 and 25 times the linear tolerance.
    pub fn from_tolerance(tolerance: &Tolerance) -> Self {
        Self {
            boundary_step: 5.0 * tolerance.linear,
            crossing_step: 25.0 * tolerance.linear,
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::from_tolerance(&Tolerance::DEFAULT)
    }
}

/// One cell: a rule tree, the material that fills it and a cached list of
/// the surfaces it touches.
///
/// The surface list is rebuilt by [`create_surface_list`]; every method
/// that edits the tree marks it stale, and queries on a stale cell walk the
/// tree directly.
///
/// [`create_surface_list`]: Object::create_surface_list
#[derive(Debug, Clone)]
pub struct Object {
    number: i32,
    material: i32,
    density: f64,
    temperature: Option<f64>,
    rules: RuleTree,
    surfaces: Vec<SurfaceHandle>,
    stale: bool,
    probe: Probe,
}

// =============================================================================
// Construction
// =============================================================================

impl Object {
    /// A cell with the given rules. Material 0 is void.
    pub fn new(number: i32, material: i32, density: f64, rules: RuleTree) -> Self {
        Self {
            number,
            material,
            density,
            temperature: None,
            rules,
            surfaces: Vec::new(),
            stale: true,
            probe: Probe::default(),
        }
    }

    /// Parse `"number material [density] expression [tmp=T]"`. The density is
    /// present exactly when the material is not 0.
    pub fn from_cell_definition(line: &str) -> Result<Self, ParseError> {
        let invalid = |message: &str| ParseError::InvalidCellDefinition {
            text: line.to_string(),
            message: message.to_string(),
        };
        let mut fields = line.split_whitespace();
        let number: i32 = fields
            .next()
            .ok_or_else(|| invalid("missing cell number"))?
            .parse()
            .map_err(|_| invalid("cell number is not an integer"))?;
        let material: i32 = fields
            .next()
            .ok_or_else(|| invalid("missing material"))?
            .parse()
            .map_err(|_| invalid("material is not an integer"))?;
        let density = if material == 0 {
            0.0
        } else {
            fields
                .next()
                .ok_or_else(|| invalid("missing density"))?
                .parse::<f64>()
                .map_err(|_| invalid("density is not a number"))?
        };

        let mut temperature = None;
        let mut expression = Vec::new();
        for field in fields {
            match field.get(..4) {
                Some(key) if key.eq_ignore_ascii_case("tmp=") => {
                    let value = field[4..]
                        .parse::<f64>()
                        .map_err(|_| invalid("temperature is not a number"))?;
                    temperature = Some(value);
                }
                _ => expression.push(field),
            }
        }
        if expression.is_empty() {
            return Err(invalid("missing cell expression"));
        }

        let rules = RuleTree::parse(&expression.join(" "))?;
        let mut object = Self::new(number, material, density, rules);
        object.temperature = temperature;
        Ok(object)
    }

    /// Replace the rules with a parsed expression. Surfaces must be bound
    /// again with [`populate`](Self::populate).
    pub fn set_from_expression(&mut self, text: &str) -> Result<(), ParseError> {
        self.rules = RuleTree::parse(text)?;
        self.invalidate();
        Ok(())
    }

    /// Use `probe` for boundary and crossing tests.
    pub fn set_probe(&mut self, probe: Probe) {
        self.probe = probe;
    }

    /// Set the cell temperature.
    pub fn set_temperature(&mut self, temperature: Option<f64>) {
        self.temperature = temperature;
    }

    /// Set the material and density.
    pub fn set_material(&mut self, material: i32, density: f64) {
        self.material = material;
        self.density = density;
    }

    fn invalidate(&mut self) {
        self.surfaces.clear();
        self.stale = true;
    }
}

// =============================================================================
// Accessors
// =============================================================================

impl Object {
    /// Cell number.
    pub fn number(&self) -> i32 {
        self.number
    }

    /// Material id; 0 is void.
    pub fn material(&self) -> i32 {
        self.material
    }

    /// Density as written in the cell definition.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Temperature, if given.
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// The rule tree.
    pub fn rules(&self) -> &RuleTree {
        &self.rules
    }

    /// Current probe steps.
    pub fn probe(&self) -> Probe {
        self.probe
    }

    /// The cached surface list; empty until
    /// [`create_surface_list`](Self::create_surface_list) runs.
    pub fn surfaces(&self) -> &[SurfaceHandle] {
        &self.surfaces
    }

    /// True if the tree changed since the surface list was built.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Distinct surface ids referenced, complements included.
    pub fn surface_ids(&self) -> Vec<i32> {
        self.rules.surface_ids()
    }

    /// True if the rules refer to another cell.
    pub fn has_complement(&self) -> bool {
        self.rules.has_complement()
    }

    fn surface_list(&self) -> Cow<'_, [SurfaceHandle]> {
        if self.stale {
            Cow::Owned(self.rules.surfaces())
        } else {
            Cow::Borrowed(&self.surfaces)
        }
    }
}

// =============================================================================
// Surfaces
// =============================================================================

impl Object {
    /// Bind every surface leaf through `registry`.
    pub fn populate(&mut self, registry: &dyn SurfaceRegistry) -> Result<(), LookupError> {
        self.rules.populate(registry)?;
        self.invalidate();
        Ok(())
    }

    /// Rebuild the cached surface list: bound surfaces in breadth-first
    /// order, deduplicated by id, complements included.
    pub fn create_surface_list(&mut self) -> &[SurfaceHandle] {
        self.surfaces = self.rules.surfaces();
        self.stale = false;
        tracing::debug!(cell = self.number, surfaces = self.surfaces.len(), "surface list built");
        &self.surfaces
    }

    /// Rename surface `old` to `new` and bind `surface` to it.
    pub fn substitute_surface(&mut self, old: i32, new: i32, surface: Option<SurfaceHandle>) -> usize {
        let n = self.rules.substitute_surface(old, new, surface);
        if n > 0 {
            self.invalidate();
        }
        n
    }

    /// Remove every reference to surface `id`.
    pub fn remove_surface(&mut self, id: i32) -> usize {
        let n = self.rules.remove_surface(id);
        if n > 0 {
            self.invalidate();
        }
        n
    }
}

// =============================================================================
// Containment
// =============================================================================

impl Object {
    /// Whether `p` lies in the cell. Points on a bounding surface count as
    /// inside.
    ///
    /// No `#N` reference is resolved here: each one counts as the complement
    /// of an empty cell, so it is true everywhere. Cells that still hold
    /// complements should go through [`is_valid_in`](Self::is_valid_in) with
    /// a resolver, or be inlined first with
    /// [`inline_referenced_cells`](Self::inline_referenced_cells).
    pub fn is_valid(&self, p: &Point3) -> bool {
        self.rules.is_valid(p)
    }

    /// [`is_valid`](Self::is_valid) resolving `#N` through `resolver`.
    pub fn is_valid_in(&self, p: &Point3, resolver: &Resolver<'_>, diagnostics: &mut Diagnostics) -> bool {
        self.rules.is_valid_in(p, resolver, diagnostics)
    }

    /// Whether `p` is on the cell boundary.
    pub fn is_on_boundary(&self, p: &Point3) -> bool {
        self.is_on_boundary_in(p, &Resolver::default(), &mut Diagnostics::new())
    }

    /// Whether `p` is on the cell boundary: some surface through `p` has a
    /// normal (or a bisector of two such normals) along which validity flips
    /// between `p - ε n` and `p + ε n`.
    pub fn is_on_boundary_in(&self, p: &Point3, resolver: &Resolver<'_>, diagnostics: &mut Diagnostics) -> bool {
        let mut normals: Vec<Vec3> = Vec::new();
        for surface in self.surface_list().iter() {
            if !surface.on_surface(p) {
                continue;
            }
            match surface.surface_normal(p) {
                Ok(n) => normals.push(n.into_inner()),
                Err(e) => diagnostics.note(DiagnosticKind::DegenerateSurface, e),
            }
        }

        let mut directions = normals.clone();
        for (i, a) in normals.iter().enumerate() {
            for b in &normals[i + 1..] {
                let bisector = a + b;
                let norm = bisector.norm();
                if norm > 1e-9 {
                    directions.push(bisector / norm);
                }
            }
        }

        let step = self.probe.boundary_step;
        directions.iter().any(|d| {
            let ahead = self.is_valid_in(&(p + d * step), resolver, diagnostics);
            let behind = self.is_valid_in(&(p - d * step), resolver, diagnostics);
            ahead != behind
        })
    }

    // =========================================================================
    // Interception
    // =========================================================================

    /// Intersect `ray` with every surface of the cell, recording entry and
    /// exit crossings in `track`. Returns the ids of the surfaces the ray
    /// crosses.
    pub fn intercept_surface(&self, ray: &Ray, track: &mut Track) -> Vec<i32> {
        self.intercept_surface_in(ray, track, &Resolver::default(), &mut Diagnostics::new())
    }

    /// [`intercept_surface`](Self::intercept_surface) with complement
    /// resolution. Hits where validity is the same just before and just
    /// after the crossing are skipped and noted.
    pub fn intercept_surface_in(
        &self,
        ray: &Ray,
        track: &mut Track,
        resolver: &Resolver<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<i32> {
        let step = self.probe.crossing_step;
        let mut crossed = Vec::new();
        for surface in self.surface_list().iter() {
            let hits = intersect_surface(ray, surface);
            if hits.is_empty() {
                continue;
            }
            crossed.push(surface.id());
            for hit in hits {
                let before = self.is_valid_in(&ray.at(hit.t - step), resolver, diagnostics);
                let after = self.is_valid_in(&ray.at(hit.t + step), resolver, diagnostics);
                if before == after {
                    diagnostics.note(
                        DiagnosticKind::AmbiguousBoundary,
                        GeometryError::AmbiguousBoundary {
                            surface: hit.surface,
                            distance: hit.t,
                        },
                    );
                    continue;
                }
                track.add_crossing(Crossing {
                    kind: if after {
                        CrossingKind::Entering
                    } else {
                        CrossingKind::Leaving
                    },
                    point: hit.point,
                    distance: hit.t,
                    cell: self.number,
                    material: self.material,
                });
            }
        }
        crossed
    }
}

// =============================================================================
// Complements
// =============================================================================

impl Object {
    /// Replace the cell by its complement.
    pub fn make_complement(&mut self) {
        self.rules.make_complement();
        self.invalidate();
    }

    /// Replace the rules by the complement of a copy of `tree`.
    pub fn make_complement_of(&mut self, tree: &RuleTree) {
        self.rules = tree.clone();
        self.make_complement();
    }

    /// Replace every `#N` by the complemented rules of cell `N`, following
    /// references inside those rules as well.
    pub fn inline_referenced_cells(&mut self, cells: &dyn CellLookup) -> Result<(), CellError> {
        if !self.rules.has_complement() {
            return Ok(());
        }
        let mut visited = vec![self.number];
        self.rules = inline(&self.rules, cells, &mut visited)?;
        self.invalidate();
        Ok(())
    }
}

fn inline(tree: &RuleTree, cells: &dyn CellLookup, visited: &mut Vec<i32>) -> Result<RuleTree, CellError> {
    let mut out = tree.clone();
    for (key, number) in out.object_complements() {
        if visited.contains(&number) {
            return Err(GeometryError::CyclicComplement(number).into());
        }
        let referenced = cells.rules(number).ok_or(LookupError::UnknownCell(number))?;

        visited.push(number);
        let mut expanded = inline(referenced, cells, visited)?;
        visited.pop();

        expanded.make_complement();
        match out.graft_root(&expanded) {
            Some(grafted) => {
                out.replace_subtree(key, grafted);
            }
            None => {
                out.replace_leaf(key, Rule::Constant(true));
            }
        }
    }
    Ok(out)
}

impl fmt::Display for Object {
    /// Writes the cell-definition line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.material)?;
        if self.material != 0 {
            write!(f, " {}", self.density)?;
        }
        write!(f, " {}", self.rules)?;
        if let Some(t) = self.temperature {
            write!(f, " tmp={t}")?;
        }
        Ok(())
    }
}
