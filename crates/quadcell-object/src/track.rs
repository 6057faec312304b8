//! Cell crossings along one ray and their linking into spans.

use std::collections::BTreeMap;

use quadcell_geom::{DiagnosticKind, Diagnostics};
use quadcell_math::{Dir3, Point3};
use quadcell_raytrace::Ray;

/// Spans shorter than this are not reported.
const MIN_SPAN: f64 = 1e-9;

/// Whether a crossing enters or leaves its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrossingKind {
    /// The ray leaves the cell. Sorts before `Entering` at equal distance.
    Leaving,
    /// The ray enters the cell.
    Entering,
}

/// One cell boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Entering or leaving.
    pub kind: CrossingKind,
    /// Where the boundary is crossed.
    pub point: Point3,
    /// Distance from the ray origin.
    pub distance: f64,
    /// Number of the cell crossed.
    pub cell: i32,
    /// Material of that cell.
    pub material: i32,
}

/// A contiguous span of the ray inside one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Cell number.
    pub cell: i32,
    /// Cell material.
    pub material: i32,
    /// Entry point.
    pub entry: Point3,
    /// Exit point.
    pub exit: Point3,
    /// Distance of the entry point from the ray origin.
    pub entry_distance: f64,
    /// Distance of the exit point from the ray origin.
    pub exit_distance: f64,
}

impl Link {
    /// Length of the span.
    pub fn length(&self) -> f64 {
        self.exit_distance - self.entry_distance
    }
}

/// Crossings gathered along a ray, linked into spans by
/// [`finalize`](Track::finalize).
#[derive(Debug, Clone)]
pub struct Track {
    origin: Point3,
    direction: Dir3,
    start: Option<(i32, i32)>,
    crossings: Vec<Crossing>,
    links: Vec<Link>,
}

impl Track {
    /// An empty track for `ray`.
    pub fn new(ray: &Ray) -> Self {
        Self {
            origin: ray.origin,
            direction: ray.direction,
            start: None,
            crossings: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Ray origin.
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Ray direction.
    pub fn direction(&self) -> &Dir3 {
        &self.direction
    }

    /// Record the cell (number, material) holding the origin. Its span opens
    /// at distance zero.
    pub fn set_start_cell(&mut self, cell: i32, material: i32) {
        self.start = Some((cell, material));
    }

    /// Cell number holding the origin, if any.
    pub fn start_cell(&self) -> Option<i32> {
        self.start.map(|(cell, _)| cell)
    }

    /// Add one crossing.
    pub fn add_crossing(&mut self, crossing: Crossing) {
        self.crossings.push(crossing);
    }

    /// Crossings in the order added, or sorted after `finalize`.
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    /// Linked spans in order along the ray.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// True if no spans were linked.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of linked spans.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Sum of span lengths.
    pub fn total_length(&self) -> f64 {
        self.links.iter().map(Link::length).sum()
    }

    /// Sort crossings by distance and pair each cell's entry with its next
    /// exit. Repeated entries or exits of the same cell at one point (corner
    /// hits) collapse; spans never closed are dropped and noted.
    pub fn finalize(&mut self, diagnostics: &mut Diagnostics) {
        self.crossings
            .sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.kind.cmp(&b.kind)));

        let mut open: BTreeMap<i32, (f64, Point3, i32)> = BTreeMap::new();
        if let Some((cell, material)) = self.start {
            open.insert(cell, (0.0, self.origin, material));
        }

        self.links.clear();
        for c in &self.crossings {
            match c.kind {
                CrossingKind::Entering => {
                    open.entry(c.cell).or_insert((c.distance, c.point, c.material));
                }
                CrossingKind::Leaving => {
                    if let Some((entry_distance, entry, material)) = open.remove(&c.cell) {
                        if c.distance - entry_distance > MIN_SPAN {
                            self.links.push(Link {
                                cell: c.cell,
                                material,
                                entry,
                                exit: c.point,
                                entry_distance,
                                exit_distance: c.distance,
                            });
                        }
                    }
                }
            }
        }
        for (cell, (distance, ..)) in open {
            diagnostics.note(
                DiagnosticKind::UnterminatedSpan,
                format_args!("cell {cell} entered at {distance} is never left"),
            );
        }
        self.links
            .sort_by(|a, b| a.entry_distance.total_cmp(&b.entry_distance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_math::Vec3;

    fn crossing(kind: CrossingKind, distance: f64, cell: i32) -> Crossing {
        Crossing {
            kind,
            point: Point3::new(distance, 0.0, 0.0),
            distance,
            cell,
            material: cell * 10,
        }
    }

    fn x_ray() -> Ray {
        Ray::new(Point3::origin(), Vec3::x()).unwrap()
    }

    #[test]
    fn test_link_from_start_cell() {
        let mut track = Track::new(&x_ray());
        track.set_start_cell(1, 10);
        track.add_crossing(crossing(CrossingKind::Entering, 2.0, 2));
        track.add_crossing(crossing(CrossingKind::Leaving, 5.0, 2));
        track.add_crossing(crossing(CrossingKind::Leaving, 2.0, 1));

        let mut diag = Diagnostics::new();
        track.finalize(&mut diag);
        assert!(diag.is_empty());
        assert_eq!(track.len(), 2);

        let first = track.links()[0];
        assert_eq!(first.cell, 1);
        assert!(first.entry_distance.abs() < 1e-12);
        assert!((first.length() - 2.0).abs() < 1e-12);
        let second = track.links()[1];
        assert_eq!(second.cell, 2);
        assert_eq!(second.material, 20);
        assert!((second.exit.x - 5.0).abs() < 1e-12);
        assert!((track.total_length() - 5.0).abs() < 1e-12);

        // Sorted with leaving first at the shared distance
        assert_eq!(track.crossings()[0].kind, CrossingKind::Leaving);
    }

    #[test]
    fn test_unterminated_span_dropped() {
        let mut track = Track::new(&x_ray());
        track.add_crossing(crossing(CrossingKind::Entering, 1.0, 3));
        let mut diag = Diagnostics::new();
        track.finalize(&mut diag);
        assert!(track.is_empty());
        assert_eq!(diag.count(DiagnosticKind::UnterminatedSpan), 1);
    }

    #[test]
    fn test_corner_duplicates_collapse() {
        let mut track = Track::new(&x_ray());
        track.add_crossing(crossing(CrossingKind::Entering, 1.0, 4));
        track.add_crossing(crossing(CrossingKind::Entering, 1.0, 4));
        track.add_crossing(crossing(CrossingKind::Leaving, 3.0, 4));
        track.add_crossing(crossing(CrossingKind::Leaving, 3.0, 4));
        let mut diag = Diagnostics::new();
        track.finalize(&mut diag);
        assert_eq!(track.len(), 1);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_zero_length_span_skipped() {
        let mut track = Track::new(&x_ray());
        track.add_crossing(crossing(CrossingKind::Entering, 1.0, 5));
        track.add_crossing(crossing(CrossingKind::Leaving, 1.0, 5));
        let mut diag = Diagnostics::new();
        track.finalize(&mut diag);
        assert!(track.is_empty());
    }
}
