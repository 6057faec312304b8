//! Diagnostics collected by parser and tracer entry points.
//!
//! Recoverable conditions (a tangent crossing, a degenerate normal, an
//! ignored operator) never abort the operation that meets them. They are
//! counted here and emitted as `tracing` events, so callers can inspect what
//! a parse or a trace glossed over.

use std::collections::BTreeMap;
use std::fmt;

/// The kind of a recovered condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// A ray crossing whose entry/exit sense could not be decided; the hit
    /// was skipped.
    AmbiguousBoundary,
    /// A surface normal vanished; the probe direction was skipped.
    DegenerateSurface,
    /// The exact quadric distance solver failed and the gradient
    /// approximation was used.
    DistanceFallback,
    /// A `:` in a cell expression that separated no two operands.
    IgnoredOperator,
    /// A surface leaf without a bound surface was met.
    UnboundSurface,
    /// A cell was entered but never left along a ray.
    UnterminatedSpan,
    /// A cell complement evaluated without its referenced cell.
    UnresolvedComplement,
}

impl DiagnosticKind {
    fn is_warning(self) -> bool {
        matches!(self, Self::UnboundSurface | Self::UnresolvedComplement)
    }
}

/// Counts of recovered conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    counts: BTreeMap<DiagnosticKind, usize>,
}

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `kind` and emit a tracing event.
    pub fn note(&mut self, kind: DiagnosticKind, detail: impl fmt::Display) {
        *self.counts.entry(kind).or_insert(0) += 1;
        if kind.is_warning() {
            tracing::warn!(?kind, "{detail}");
        } else {
            tracing::debug!(?kind, "{detail}");
        }
    }

    /// Occurrences of `kind` so far.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Occurrences of every kind.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Add another collection's counts into this one.
    pub fn merge(&mut self, other: &Diagnostics) {
        for (kind, n) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += n;
        }
    }

    /// Iterate over `(kind, count)` pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (DiagnosticKind, usize)> + '_ {
        self.counts.iter().map(|(k, n)| (*k, *n))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return write!(f, "no diagnostics");
        }
        let parts: Vec<String> = self.iter().map(|(k, n)| format!("{k:?}={n}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_and_merge() {
        let mut a = Diagnostics::new();
        assert!(a.is_empty());
        a.note(DiagnosticKind::AmbiguousBoundary, "tangent");
        a.note(DiagnosticKind::AmbiguousBoundary, "tangent");

        let mut b = Diagnostics::new();
        b.note(DiagnosticKind::UnterminatedSpan, "cell 3");
        a.merge(&b);

        assert_eq!(a.count(DiagnosticKind::AmbiguousBoundary), 2);
        assert_eq!(a.count(DiagnosticKind::UnterminatedSpan), 1);
        assert_eq!(a.count(DiagnosticKind::DistanceFallback), 0);
        assert_eq!(a.total(), 3);
        assert_eq!(a.to_string(), "AmbiguousBoundary=2, UnterminatedSpan=1");
    }
}
