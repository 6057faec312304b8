//! Geometry decks: a cell block and a surface block in one text.
//!
//! ```text
//! c two slabs
//! 1 3 0.0722 -10 11
//! 2 0 10 -12
//!
//! 10 px 0
//! 11 px -10
//! 12 px 10
//! ```
//!
//! The first blank line ends the cell block and the next one ends the
//! surface block; anything after it is ignored. `c` lines are comments and
//! text after `$` on a line is a comment.

use quadcell_geom::{is_comment, Surface, SurfaceStore};
use quadcell_object::Object;

use crate::config::TraceSettings;
use crate::error::Result;
use crate::manager::GeometryManager;

/// Parsed cells and surfaces, not yet bound together.
#[derive(Debug, Clone, Default)]
pub struct GeometryDeck {
    /// Cells in deck order.
    pub cells: Vec<Object>,
    /// Surfaces by id.
    pub surfaces: SurfaceStore,
}

#[derive(Clone, Copy, PartialEq)]
enum Block {
    Cells,
    Surfaces,
    Done,
}

impl GeometryDeck {
    /// Parse a deck.
    pub fn parse(text: &str) -> Result<Self> {
        let mut deck = Self::default();
        let mut block = Block::Cells;

        for raw in text.lines() {
            let line = raw.split('$').next().unwrap_or_default();
            if line.trim().is_empty() {
                block = match (block, deck.cells.is_empty(), deck.surfaces.is_empty()) {
                    (Block::Cells, false, _) => Block::Surfaces,
                    (Block::Surfaces, _, false) => Block::Done,
                    (b, _, _) => b,
                };
                continue;
            }
            if is_comment(line) {
                continue;
            }
            match block {
                Block::Cells => deck.cells.push(Object::from_cell_definition(line)?),
                Block::Surfaces => {
                    deck.surfaces.insert(Surface::from_text(line)?);
                }
                Block::Done => break,
            }
        }
        tracing::debug!(
            cells = deck.cells.len(),
            surfaces = deck.surfaces.len(),
            "deck parsed"
        );
        Ok(deck)
    }

    /// Build an indexed geometry: apply the surface settings, add the cells,
    /// bind their surfaces, inline cell complements and build the adjacency
    /// index.
    pub fn into_manager(mut self, settings: &TraceSettings) -> Result<GeometryManager> {
        settings.validate()?;
        self.surfaces.set_distance_solver(settings.distance_solver);
        self.surfaces.set_tolerance(settings.tolerance);

        let mut manager = GeometryManager::with_settings(settings);
        for cell in self.cells {
            manager.add_object(cell)?;
        }
        manager.populate(&self.surfaces)?;
        manager.inline_referenced_cells()?;
        manager.build_adjacency_index()?;
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use quadcell_geom::{GeometryError, ParseError};
    use quadcell_math::Point3;
    use quadcell_rules::LookupError;

    const SLABS: &str = "c two slabs
1 3 0.0722 -10 11   $ left
2 0 10 -12

10 px 0
11 px -10
12 px 10

mode n
";

    #[test]
    fn test_parse_deck() {
        let deck = GeometryDeck::parse(SLABS).unwrap();
        assert_eq!(deck.cells.len(), 2);
        assert_eq!(deck.surfaces.len(), 3);
        assert_eq!(deck.cells[0].to_string(), "1 3 0.0722 -10 11");
    }

    #[test]
    fn test_into_manager() {
        let manager = GeometryDeck::parse(SLABS)
            .unwrap()
            .into_manager(&TraceSettings::default())
            .unwrap();
        assert!(manager.is_indexed());
        assert_eq!(manager.locate_cell(&Point3::new(5.0, 0.0, 0.0), None), Some(1));
    }

    #[test]
    fn test_deck_errors() {
        assert!(matches!(
            GeometryDeck::parse("1 0 -1 (2\n\n1 px 0\n"),
            Err(Error::Parse(ParseError::UnmatchedBracket { .. }))
        ));
        assert!(matches!(
            GeometryDeck::parse("1 0 -1\n\n1 qq 0\n"),
            Err(Error::Parse(ParseError::UnknownTag { .. }))
        ));

        let missing = GeometryDeck::parse("1 0 -1 2\n\n1 px 0\n").unwrap();
        assert!(matches!(
            missing.into_manager(&TraceSettings::default()),
            Err(Error::Lookup(LookupError::UnknownSurface(2)))
        ));

        let duplicate = GeometryDeck::parse("1 0 -1\n1 0 1\n\n1 px 0\n").unwrap();
        assert!(matches!(
            duplicate.into_manager(&TraceSettings::default()),
            Err(Error::Geometry(GeometryError::DuplicateCell(1)))
        ));
    }
}
