//! Error types shared by the surface, rule and cell layers.

use thiserror::Error;

/// Malformed surface or cell text.
///
/// Every variant carries the offending text so a corrupt geometry definition
/// can be located in its source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The surface type tag is not recognised.
    #[error("unknown surface type '{tag}' in '{text}'")]
    UnknownTag {
        /// The tag as written.
        tag: String,
        /// The whole descriptor.
        text: String,
    },

    /// A surface tag received the wrong number of parameters.
    #[error("surface type '{tag}' takes {expected} parameters, found {found} in '{text}'")]
    WrongArity {
        /// The tag as written.
        tag: String,
        /// Parameters required by the tag.
        expected: usize,
        /// Parameters present.
        found: usize,
        /// The whole descriptor.
        text: String,
    },

    /// A token that should be a number is not.
    #[error("expected a number, found '{token}' in '{text}'")]
    NonNumeric {
        /// The token that failed to parse.
        token: String,
        /// The whole descriptor.
        text: String,
    },

    /// Parameters parse but describe no valid surface (zero normal,
    /// non-positive radius, ...).
    #[error("invalid parameters for '{tag}': {message}")]
    InvalidParameter {
        /// The tag as written.
        tag: String,
        /// What is wrong with the parameters.
        message: String,
    },

    /// A bracket without its partner.
    #[error("unmatched bracket in '{text}'")]
    UnmatchedBracket {
        /// The expression around the bracket.
        text: String,
    },

    /// A bracket pair with nothing inside.
    #[error("empty bracket in '{text}'")]
    EmptyBracket {
        /// The expression around the bracket.
        text: String,
    },

    /// A placeholder references a rule that is not in the index.
    #[error("placeholder {index} does not reference a rule in '{text}'")]
    DanglingPlaceholder {
        /// Placeholder index.
        index: usize,
        /// The expression being reduced.
        text: String,
    },

    /// A character that has no meaning in a cell expression.
    #[error("unexpected character '{found}' at offset {offset} in '{text}'")]
    UnexpectedCharacter {
        /// The character.
        found: char,
        /// Byte offset into the expression.
        offset: usize,
        /// The expression.
        text: String,
    },

    /// The expression did not reduce to a single rule.
    #[error("expression '{text}' reduces to {remaining} rules, expected 1")]
    MalformedExpression {
        /// The expression.
        text: String,
        /// Rules left after reduction.
        remaining: usize,
    },

    /// A cell-definition line is missing a field or has a bad parameter.
    #[error("invalid cell definition '{text}': {message}")]
    InvalidCellDefinition {
        /// The line.
        text: String,
        /// What is wrong.
        message: String,
    },
}

/// Geometric failures: degenerate shapes, unclassifiable crossings and
/// inconsistent cell graphs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The surface has no usable normal at a point, or its parameters
    /// collapse it.
    #[error("surface {id} is degenerate: {reason}")]
    DegenerateSurface {
        /// Surface id.
        id: i32,
        /// What degenerated.
        reason: String,
    },

    /// Entry/exit could not be decided for a ray crossing.
    #[error("ambiguous crossing of surface {surface} at distance {distance}")]
    AmbiguousBoundary {
        /// Surface id that was hit.
        surface: i32,
        /// Distance along the ray.
        distance: f64,
    },

    /// A cell complement refers back to itself, directly or through others.
    #[error("cyclic complement through cell {0}")]
    CyclicComplement(i32),

    /// A transform that does not preserve the surface type.
    #[error("surface {id} cannot take a non-rigid transform")]
    NonRigidTransform {
        /// Surface id.
        id: i32,
    },

    /// The surface-to-cell index does not reflect the current cells.
    #[error("adjacency index is out of date; rebuild it before tracing")]
    StaleIndex,

    /// Two cells share a number.
    #[error("cell number {0} is already defined")]
    DuplicateCell(i32),
}
