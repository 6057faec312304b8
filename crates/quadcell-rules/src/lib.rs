#![warn(missing_docs)]

//! Boolean rule trees for the quadcell CSG kernel.
//!
//! A cell is the set of points satisfying a boolean expression over surface
//! half-spaces. The expression is held as a [`RuleTree`]: an arena of
//! [`Rule`] nodes addressed by [`RuleKey`], where operators own their
//! children by key and every node records its parent.
//!
//! Cell expressions use juxtaposition for intersection, `:` for union,
//! `#(...)` for the complement of a group and `#N` for the complement of
//! cell `N`:
//!
//! ```ignore
//! let tree = RuleTree::parse("-1 2 (3 : -4) #7")?;
//! ```
//!
//! The parser reduces operands strictly left to right within each bracket
//! level, so `1 : 2 3` means `(1 : 2) 3`.

mod display;
pub mod error;
pub mod lookup;
mod parser;
pub mod tree;

pub use error::LookupError;
pub use lookup::{CellLookup, NoCells, Resolver, DEFAULT_MAX_DEPTH};
pub use tree::{Rule, RuleKey, RuleNode, RuleTree, SurfaceLeaf};
