//! Resolution of cell complements during evaluation.

use std::collections::BTreeMap;

use crate::tree::RuleTree;

/// Nesting limit for `#N` references followed during one evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Anything that can find the rule tree of a cell by its number.
pub trait CellLookup {
    /// The rules of cell `number`, if it exists.
    fn rules(&self, number: i32) -> Option<&RuleTree>;
}

/// A lookup with no cells; every `#N` stays unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCells;

impl CellLookup for NoCells {
    fn rules(&self, _number: i32) -> Option<&RuleTree> {
        None
    }
}

impl CellLookup for BTreeMap<i32, RuleTree> {
    fn rules(&self, number: i32) -> Option<&RuleTree> {
        self.get(&number)
    }
}

/// Cells available to an evaluation, with the depth limit for following
/// complement references.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    /// Where `#N` references are looked up.
    pub cells: &'a dyn CellLookup,
    /// How many nested references may be followed.
    pub max_depth: usize,
}

impl<'a> Resolver<'a> {
    /// Resolve through `cells` with the default depth limit.
    pub fn new(cells: &'a dyn CellLookup) -> Self {
        Self {
            cells,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Resolver<'_> {
    fn default() -> Self {
        Self::new(&NoCells)
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
