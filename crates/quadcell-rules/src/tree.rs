//! The rule arena: evaluation, search and tree surgery.

use std::collections::{BTreeMap, HashSet, VecDeque};

use quadcell_geom::{DiagnosticKind, Diagnostics, SurfaceHandle, SurfaceRegistry};
use quadcell_math::Point3;
use slotmap::{new_key_type, SlotMap};

use crate::error::LookupError;
use crate::lookup::Resolver;

new_key_type! {
    /// Stable handle of a node in a [`RuleTree`].
    pub struct RuleKey;
}

/// A signed reference to a surface.
#[derive(Debug, Clone)]
pub struct SurfaceLeaf {
    /// Surface id (always non-negative).
    pub id: i32,
    /// `+1` for the outside half-space, `-1` for the inside.
    pub sign: i32,
    /// The bound surface, once populated.
    pub surface: Option<SurfaceHandle>,
}

impl SurfaceLeaf {
    /// Leaf for a signed surface number as written in a cell expression.
    pub fn new(signed_id: i32) -> Self {
        Self {
            id: signed_id.abs(),
            sign: if signed_id < 0 { -1 } else { 1 },
            surface: None,
        }
    }

    /// The signed number as written: `-id` for the inside.
    pub fn signed_id(&self) -> i32 {
        self.sign * self.id
    }
}

/// One node of a rule tree.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Both children hold.
    Intersection(RuleKey, RuleKey),
    /// Either child holds.
    Union(RuleKey, RuleKey),
    /// A surface half-space.
    Surface(SurfaceLeaf),
    /// The complement of another cell, by number.
    ObjectComplement(i32),
    /// The complement of a sub-expression.
    GroupComplement(RuleKey),
    /// A fixed truth value.
    Constant(bool),
}

impl Rule {
    /// Child keys in order.
    pub fn children(&self) -> [Option<RuleKey>; 2] {
        match self {
            Self::Intersection(a, b) | Self::Union(a, b) => [Some(*a), Some(*b)],
            Self::GroupComplement(c) => [Some(*c), None],
            _ => [None, None],
        }
    }

    /// True for nodes without children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Surface(_) | Self::ObjectComplement(_) | Self::Constant(_)
        )
    }

    fn replace_child(&mut self, old: RuleKey, new: RuleKey) {
        match self {
            Self::Intersection(a, b) | Self::Union(a, b) => {
                if *a == old {
                    *a = new;
                } else if *b == old {
                    *b = new;
                }
            }
            Self::GroupComplement(c) if *c == old => *c = new,
            _ => {}
        }
    }
}

/// A rule plus the key of the node that owns it.
#[derive(Debug, Clone)]
pub struct RuleNode {
    /// Owning node; `None` for the root and for unattached nodes.
    pub parent: Option<RuleKey>,
    /// The rule.
    pub rule: Rule,
}

/// A boolean expression over surface half-spaces.
///
/// Cloning copies the arena with its keys, so the copy's parent links are
/// correct and it shares nothing mutable with the original.
#[derive(Debug, Clone, Default)]
pub struct RuleTree {
    nodes: SlotMap<RuleKey, RuleNode>,
    root: Option<RuleKey>,
}

// =============================================================================
// Construction and access
// =============================================================================

impl RuleTree {
    /// An empty tree. It contains no points.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding a single rule.
    pub fn single(rule: Rule) -> Self {
        let mut tree = Self::new();
        let key = tree.insert(rule);
        tree.root = Some(key);
        tree
    }

    /// Add a node, adopting the children its rule names. The node is not
    /// attached to the root until [`set_root`](Self::set_root) or an
    /// operator node adopts it.
    pub fn insert(&mut self, rule: Rule) -> RuleKey {
        let children = rule.children();
        let key = self.nodes.insert(RuleNode { parent: None, rule });
        for child in children.into_iter().flatten() {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(key);
            }
        }
        key
    }

    /// Make `key` the root.
    pub fn set_root(&mut self, key: RuleKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.parent = None;
            self.root = Some(key);
        }
    }

    /// The root, if the tree is not empty.
    pub fn root(&self) -> Option<RuleKey> {
        self.root
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no root.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Node at `key`.
    pub fn node(&self, key: RuleKey) -> Option<&RuleNode> {
        self.nodes.get(key)
    }

    /// Rule at `key`.
    pub fn rule(&self, key: RuleKey) -> Option<&Rule> {
        self.nodes.get(key).map(|n| &n.rule)
    }

    /// Parent of `key`.
    pub fn parent(&self, key: RuleKey) -> Option<RuleKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    /// Every node reachable from the root has the parent that owns it, and
    /// the root has none.
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.root else {
            return true;
        };
        if self.parent(root).is_some() {
            return false;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            if !seen.insert(key) {
                return false;
            }
            let Some(node) = self.nodes.get(key) else {
                return false;
            };
            for child in node.rule.children().into_iter().flatten() {
                if self.parent(child) != Some(key) {
                    return false;
                }
                stack.push(child);
            }
        }
        true
    }

    /// Keys reachable from the root, breadth first, descending through
    /// every operator including complements.
    pub fn breadth_first(&self) -> Vec<RuleKey> {
        let mut order = Vec::new();
        let mut queue: VecDeque<RuleKey> = self.root.into_iter().collect();
        while let Some(key) = queue.pop_front() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            order.push(key);
            queue.extend(node.rule.children().into_iter().flatten());
        }
        order
    }

    fn post_order(&self, key: RuleKey, out: &mut Vec<RuleKey>) {
        if let Some(node) = self.nodes.get(key) {
            for child in node.rule.children().into_iter().flatten() {
                self.post_order(child, out);
            }
            out.push(key);
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

impl RuleTree {
    /// Whether `p` satisfies the expression. Cell complements are not
    /// resolved and count as the complement of an empty cell.
    pub fn is_valid(&self, p: &Point3) -> bool {
        self.is_valid_in(p, &Resolver::default(), &mut Diagnostics::new())
    }

    /// Whether `p` satisfies the expression, resolving `#N` through
    /// `resolver`.
    pub fn is_valid_in(&self, p: &Point3, resolver: &Resolver<'_>, diagnostics: &mut Diagnostics) -> bool {
        let leaf = |leaf: &SurfaceLeaf, diagnostics: &mut Diagnostics| match &leaf.surface {
            Some(surface) => surface.side(p).sign() * leaf.sign >= 0,
            None => {
                diagnostics.note(
                    DiagnosticKind::UnboundSurface,
                    format_args!("surface {} evaluated before populate", leaf.id),
                );
                false
            }
        };
        self.eval_root(&leaf, resolver, 0, diagnostics)
    }

    /// Evaluate from a precomputed map of surface id to "point is on the
    /// outside". A surface missing from the map makes its leaf false.
    pub fn is_valid_map(&self, outside: &BTreeMap<i32, bool>) -> bool {
        self.is_valid_map_in(outside, &Resolver::default(), &mut Diagnostics::new())
    }

    /// [`is_valid_map`](Self::is_valid_map) with complement resolution.
    pub fn is_valid_map_in(
        &self,
        outside: &BTreeMap<i32, bool>,
        resolver: &Resolver<'_>,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let leaf = |leaf: &SurfaceLeaf, _: &mut Diagnostics| match outside.get(&leaf.id) {
            Some(&out) => out == (leaf.sign > 0),
            None => false,
        };
        self.eval_root(&leaf, resolver, 0, diagnostics)
    }

    fn eval_root<F>(&self, leaf: &F, resolver: &Resolver<'_>, depth: usize, diagnostics: &mut Diagnostics) -> bool
    where
        F: Fn(&SurfaceLeaf, &mut Diagnostics) -> bool,
    {
        match self.root {
            Some(root) => self.eval(root, leaf, resolver, depth, diagnostics),
            None => false,
        }
    }

    fn eval<F>(
        &self,
        key: RuleKey,
        leaf: &F,
        resolver: &Resolver<'_>,
        depth: usize,
        diagnostics: &mut Diagnostics,
    ) -> bool
    where
        F: Fn(&SurfaceLeaf, &mut Diagnostics) -> bool,
    {
        let Some(node) = self.nodes.get(key) else {
            return false;
        };
        match &node.rule {
            Rule::Intersection(a, b) => {
                self.eval(*a, leaf, resolver, depth, diagnostics)
                    && self.eval(*b, leaf, resolver, depth, diagnostics)
            }
            Rule::Union(a, b) => {
                self.eval(*a, leaf, resolver, depth, diagnostics)
                    || self.eval(*b, leaf, resolver, depth, diagnostics)
            }
            Rule::Surface(s) => leaf(s, diagnostics),
            Rule::GroupComplement(c) => !self.eval(*c, leaf, resolver, depth, diagnostics),
            Rule::Constant(v) => *v,
            Rule::ObjectComplement(n) => {
                if depth >= resolver.max_depth {
                    diagnostics.note(
                        DiagnosticKind::UnresolvedComplement,
                        format_args!("#{n} exceeds complement depth {}", resolver.max_depth),
                    );
                    return true;
                }
                match resolver.cells.rules(*n) {
                    Some(tree) => !tree.eval_root(leaf, resolver, depth + 1, diagnostics),
                    None => {
                        diagnostics.note(
                            DiagnosticKind::UnresolvedComplement,
                            format_args!("cell {n} is not available"),
                        );
                        true
                    }
                }
            }
        }
    }
}

// =============================================================================
// Search and surfaces
// =============================================================================

impl RuleTree {
    /// First leaf for surface `id` (either sign), depth first, not looking
    /// inside complements.
    pub fn find_key(&self, id: i32) -> Option<RuleKey> {
        self.find(|leaf| leaf.id == id)
    }

    /// First leaf for surface `id` with the given sign, depth first, not
    /// looking inside complements.
    pub fn find_surface_leaf(&self, id: i32, sign: i32) -> Option<RuleKey> {
        self.find(|leaf| leaf.id == id && leaf.sign == sign.signum())
    }

    fn find(&self, matches: impl Fn(&SurfaceLeaf) -> bool) -> Option<RuleKey> {
        let mut stack: Vec<RuleKey> = self.root.into_iter().collect();
        while let Some(key) = stack.pop() {
            match self.rule(key)? {
                Rule::Surface(leaf) if matches(leaf) => return Some(key),
                Rule::Intersection(a, b) | Rule::Union(a, b) => {
                    stack.push(*b);
                    stack.push(*a);
                }
                _ => {}
            }
        }
        None
    }

    /// Surface leaves in breadth-first order, including those inside
    /// complements.
    pub fn surface_leaves(&self) -> Vec<(RuleKey, &SurfaceLeaf)> {
        self.breadth_first()
            .into_iter()
            .filter_map(|key| match self.rule(key) {
                Some(Rule::Surface(leaf)) => Some((key, leaf)),
                _ => None,
            })
            .collect()
    }

    /// Distinct surface ids in first breadth-first encounter order.
    pub fn surface_ids(&self) -> Vec<i32> {
        let mut seen = HashSet::new();
        self.surface_leaves()
            .into_iter()
            .filter_map(|(_, leaf)| seen.insert(leaf.id).then_some(leaf.id))
            .collect()
    }

    /// Distinct bound surfaces in first breadth-first encounter order.
    pub fn surfaces(&self) -> Vec<SurfaceHandle> {
        let mut seen = HashSet::new();
        self.surface_leaves()
            .into_iter()
            .filter_map(|(_, leaf)| leaf.surface.clone())
            .filter(|s| seen.insert(s.id()))
            .collect()
    }

    /// `#N` leaves with the cell number each refers to.
    pub fn object_complements(&self) -> Vec<(RuleKey, i32)> {
        self.breadth_first()
            .into_iter()
            .filter_map(|key| match self.rule(key) {
                Some(Rule::ObjectComplement(n)) => Some((key, *n)),
                _ => None,
            })
            .collect()
    }

    /// True if the expression refers to another cell.
    pub fn has_complement(&self) -> bool {
        !self.object_complements().is_empty()
    }

    /// Bind every surface leaf to its surface, breadth first.
    pub fn populate(&mut self, registry: &dyn SurfaceRegistry) -> Result<(), LookupError> {
        for key in self.breadth_first() {
            if let Some(RuleNode {
                rule: Rule::Surface(leaf),
                ..
            }) = self.nodes.get_mut(key)
            {
                let surface = registry
                    .lookup(leaf.id)
                    .ok_or(LookupError::UnknownSurface(leaf.id))?;
                leaf.surface = Some(surface);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tree surgery
// =============================================================================

impl RuleTree {
    /// Overwrite a leaf with another leaf rule. Returns false if `key` is not
    /// a leaf or `rule` is not one.
    pub fn replace_leaf(&mut self, key: RuleKey, rule: Rule) -> bool {
        if !rule.is_leaf() {
            return false;
        }
        match self.nodes.get_mut(key) {
            Some(node) if node.rule.is_leaf() => {
                node.rule = rule;
                true
            }
            _ => false,
        }
    }

    /// Put the unattached node `new` where `old` is and drop `old` with its
    /// descendants.
    pub fn replace_subtree(&mut self, old: RuleKey, new: RuleKey) -> bool {
        if old == new || !self.nodes.contains_key(old) || !self.nodes.contains_key(new) {
            return false;
        }
        if self.parent(new).is_some() || self.root == Some(new) {
            return false;
        }
        let parent = self.parent(old);
        self.relink(parent, old, new);
        self.remove_subtree(old);
        true
    }

    /// Rename every leaf for surface `old` to `new`, keeping its sign (a
    /// negative `new` flips it) and binding `surface`. Returns the number of
    /// leaves changed.
    pub fn substitute_surface(&mut self, old: i32, new: i32, surface: Option<SurfaceHandle>) -> usize {
        let mut count = 0;
        for node in self.nodes.values_mut() {
            if let Rule::Surface(leaf) = &mut node.rule {
                if leaf.id == old {
                    leaf.id = new.abs();
                    if new < 0 {
                        leaf.sign = -leaf.sign;
                    }
                    leaf.surface = surface.clone();
                    count += 1;
                }
            }
        }
        count
    }

    /// Remove every leaf for surface `id`; each leaf's parent operator is
    /// replaced by the leaf's sibling, and a complement left empty goes with
    /// it. Returns the number of leaves removed.
    pub fn remove_surface(&mut self, id: i32) -> usize {
        let targets: Vec<RuleKey> = self
            .surface_leaves()
            .into_iter()
            .filter(|(_, leaf)| leaf.id == id)
            .map(|(key, _)| key)
            .collect();
        let mut removed = 0;
        for key in targets {
            if self.nodes.contains_key(key) {
                self.detach(key);
                removed += 1;
            }
        }
        removed
    }

    fn detach(&mut self, key: RuleKey) {
        match self.parent(key) {
            None => {
                if self.root == Some(key) {
                    self.root = None;
                }
                self.remove_subtree(key);
            }
            Some(parent) => match self.rule(parent).cloned() {
                Some(Rule::Intersection(a, b)) | Some(Rule::Union(a, b)) => {
                    let sibling = if a == key { b } else { a };
                    self.collapse_into(parent, sibling);
                }
                _ => self.detach(parent),
            },
        }
    }

    /// Wrap the whole expression in a group complement.
    pub fn make_complement(&mut self) {
        if let Some(root) = self.root {
            let key = self.insert(Rule::GroupComplement(root));
            self.root = Some(key);
        }
    }

    /// `self AND other`.
    pub fn add_intersection(&mut self, other: &RuleTree) {
        self.combine(other, Rule::Intersection);
    }

    /// `self OR other`.
    pub fn add_union(&mut self, other: &RuleTree) {
        self.combine(other, Rule::Union);
    }

    fn combine(&mut self, other: &RuleTree, op: fn(RuleKey, RuleKey) -> Rule) {
        let Some(grafted) = self.graft_root(other) else {
            return;
        };
        let root = match self.root {
            Some(root) => self.insert(op(root, grafted)),
            None => grafted,
        };
        self.root = Some(root);
    }

    /// Copy the subtree of `other` at `from` into this arena. The copy is
    /// unattached; its key is returned.
    pub fn graft(&mut self, other: &RuleTree, from: RuleKey) -> Option<RuleKey> {
        let rule = match other.rule(from)? {
            Rule::Intersection(a, b) => {
                let a = self.graft(other, *a)?;
                let b = self.graft(other, *b)?;
                Rule::Intersection(a, b)
            }
            Rule::Union(a, b) => {
                let a = self.graft(other, *a)?;
                let b = self.graft(other, *b)?;
                Rule::Union(a, b)
            }
            Rule::GroupComplement(c) => Rule::GroupComplement(self.graft(other, *c)?),
            leaf => leaf.clone(),
        };
        Some(self.insert(rule))
    }

    /// Copy all of `other` into this arena, unattached.
    pub fn graft_root(&mut self, other: &RuleTree) -> Option<RuleKey> {
        self.graft(other, other.root?)
    }

    /// Fold boolean constants out of the tree. Returns true if anything
    /// changed.
    pub fn simplify(&mut self) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut order = Vec::new();
        self.post_order(root, &mut order);

        let mut changed = false;
        for key in order {
            let Some(rule) = self.rule(key).cloned() else {
                continue;
            };
            match rule {
                Rule::Intersection(a, b) | Rule::Union(a, b) => {
                    let is_and = matches!(rule, Rule::Intersection(..));
                    let folded = match (self.constant(a), self.constant(b)) {
                        (Some(x), _) => Some((x, b)),
                        (_, Some(y)) => Some((y, a)),
                        _ => None,
                    };
                    if let Some((value, other)) = folded {
                        // true AND x = x, false OR x = x; otherwise the constant wins
                        if value == is_and {
                            self.collapse_into(key, other);
                        } else {
                            self.set_constant(key, value);
                        }
                        changed = true;
                    }
                }
                Rule::GroupComplement(c) => {
                    if let Some(value) = self.constant(c) {
                        self.set_constant(key, !value);
                        changed = true;
                    }
                }
                _ => {}
            }
        }
        changed
    }

    fn constant(&self, key: RuleKey) -> Option<bool> {
        match self.rule(key)? {
            Rule::Constant(v) => Some(*v),
            _ => None,
        }
    }

    fn set_constant(&mut self, key: RuleKey, value: bool) {
        let children = match self.rule(key) {
            Some(rule) => rule.children(),
            None => return,
        };
        for child in children.into_iter().flatten() {
            self.remove_subtree(child);
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.rule = Rule::Constant(value);
        }
    }

    /// Replace operator `key` by its child `keep`, dropping the other child.
    fn collapse_into(&mut self, key: RuleKey, keep: RuleKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let parent = node.parent;
        let others: Vec<RuleKey> = node
            .rule
            .children()
            .into_iter()
            .flatten()
            .filter(|c| *c != keep)
            .collect();
        self.relink(parent, key, keep);
        for other in others {
            self.remove_subtree(other);
        }
        self.nodes.remove(key);
    }

    fn relink(&mut self, parent: Option<RuleKey>, old: RuleKey, new: RuleKey) {
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(p) {
                    node.rule.replace_child(old, new);
                }
            }
            None => {
                if self.root == Some(old) {
                    self.root = Some(new);
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(new) {
            node.parent = parent;
        }
    }

    fn remove_subtree(&mut self, key: RuleKey) {
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.remove(k) {
                stack.extend(node.rule.children().into_iter().flatten());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcell_geom::SurfaceStore;

    fn unit_box() -> SurfaceStore {
        SurfaceStore::parse(
            "1 px -1
             2 px 1
             3 py -1
             4 py 1
             5 pz -1
             6 pz 1",
        )
        .unwrap()
    }

    fn leaf(tree: &RuleTree, key: RuleKey) -> i32 {
        match tree.rule(key) {
            Some(Rule::Surface(s)) => s.signed_id(),
            other => panic!("expected a surface leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_box_cell() {
        let mut tree = RuleTree::parse("1 -2 3 -4 5 -6").unwrap();
        tree.populate(&unit_box()).unwrap();
        assert!(tree.is_valid(&Point3::origin()));
        assert!(!tree.is_valid(&Point3::new(2.0, 0.0, 0.0)));
        // On a face counts as inside
        assert!(tree.is_valid(&Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_populate_unknown_surface() {
        let mut tree = RuleTree::parse("1 -7").unwrap();
        assert_eq!(tree.populate(&unit_box()), Err(LookupError::UnknownSurface(7)));
    }

    #[test]
    fn test_unbound_leaf_is_false() {
        let tree = RuleTree::parse("1").unwrap();
        let mut diag = Diagnostics::new();
        assert!(!tree.is_valid_in(&Point3::origin(), &Resolver::default(), &mut diag));
        assert_eq!(diag.count(DiagnosticKind::UnboundSurface), 1);
    }

    #[test]
    fn test_map_evaluation() {
        let tree = RuleTree::parse("1 -2 : 3").unwrap();
        let mut map = BTreeMap::new();
        map.insert(1, true);
        map.insert(2, false);
        map.insert(3, false);
        // (1 -2) : 3 -> (true and true) or false
        assert!(tree.is_valid_map(&map));
        map.insert(2, true);
        assert!(!tree.is_valid_map(&map));
        map.remove(&3);
        assert!(!tree.is_valid_map(&map));
    }

    #[test]
    fn test_object_complement_resolution() {
        let store = unit_box();
        let mut inner = RuleTree::parse("1 -2 3 -4 5 -6").unwrap();
        inner.populate(&store).unwrap();
        let mut cells = BTreeMap::new();
        cells.insert(10, inner);

        let outer = RuleTree::parse("#10").unwrap();
        let resolver = Resolver::new(&cells);
        let mut diag = Diagnostics::new();
        assert!(!outer.is_valid_in(&Point3::origin(), &resolver, &mut diag));
        assert!(outer.is_valid_in(&Point3::new(3.0, 0.0, 0.0), &resolver, &mut diag));
        assert!(diag.is_empty());

        // Unresolved: complement of an empty cell
        assert!(outer.is_valid(&Point3::origin()));
    }

    #[test]
    fn test_complement_depth_guard() {
        let mut cells = BTreeMap::new();
        cells.insert(1, RuleTree::parse("#2").unwrap());
        cells.insert(2, RuleTree::parse("#1").unwrap());
        let resolver = Resolver::new(&cells).with_max_depth(8);
        let mut diag = Diagnostics::new();
        let tree = RuleTree::parse("#1").unwrap();
        // Terminates; the depth limit is noted
        tree.is_valid_in(&Point3::origin(), &resolver, &mut diag);
        assert_eq!(diag.count(DiagnosticKind::UnresolvedComplement), 1);
    }

    #[test]
    fn test_clone_invariant() {
        let tree = RuleTree::parse("1 (2 : #(3 -4)) : #7 5").unwrap();
        let mut copy = tree.clone();
        assert!(copy.is_consistent());
        for key in copy.breadth_first() {
            for child in copy.rule(key).unwrap().children().into_iter().flatten() {
                assert_eq!(copy.parent(child), Some(key));
            }
        }

        let before = tree.to_string();
        copy.remove_surface(2);
        copy.make_complement();
        assert_ne!(copy.to_string(), before);
        assert_eq!(tree.to_string(), before);
        assert!(tree.is_consistent());
        assert!(copy.is_consistent());
    }

    #[test]
    fn test_find_does_not_enter_complements() {
        let tree = RuleTree::parse("1 #(2 -3) -3").unwrap();
        assert!(tree.find_key(2).is_none());
        let k = tree.find_key(3).unwrap();
        assert_eq!(leaf(&tree, k), -3);
        assert!(tree.find_surface_leaf(3, 1).is_none());
        assert!(tree.find_surface_leaf(1, 1).is_some());
    }

    #[test]
    fn test_surface_ids_breadth_first() {
        let tree = RuleTree::parse("(4 : 5) #(2 3) 1 -4").unwrap();
        // Root is ((U(4,5) #(..)) 1) -4
        assert_eq!(tree.surface_ids(), vec![4, 1, 5, 2, 3]);
    }

    #[test]
    fn test_replace_leaf() {
        let mut tree = RuleTree::parse("1 2").unwrap();
        let key = tree.find_key(2).unwrap();
        assert!(tree.replace_leaf(key, Rule::Surface(SurfaceLeaf::new(-9))));
        assert_eq!(tree.to_string(), "1 -9");
        let root = tree.root().unwrap();
        assert!(!tree.replace_leaf(root, Rule::Constant(true)));
        assert!(!tree.replace_leaf(key, Rule::GroupComplement(root)));
    }

    #[test]
    fn test_substitute_surface() {
        let mut tree = RuleTree::parse("1 -2 #(2 : 3)").unwrap();
        assert_eq!(tree.substitute_surface(2, 20, None), 2);
        assert_eq!(tree.to_string(), "1 -20 #(20 : 3)");
        assert_eq!(tree.substitute_surface(3, -30, None), 1);
        assert_eq!(tree.to_string(), "1 -20 #(20 : -30)");
    }

    #[test]
    fn test_remove_surface_collapses_parent() {
        let mut tree = RuleTree::parse("1 (2 : 3) 4").unwrap();
        assert_eq!(tree.remove_surface(2), 1);
        assert_eq!(tree.to_string(), "1 3 4");
        assert!(tree.is_consistent());

        let mut tree = RuleTree::parse("1 #(2)").unwrap();
        tree.remove_surface(2);
        assert_eq!(tree.to_string(), "1");

        let mut tree = RuleTree::parse("5").unwrap();
        tree.remove_surface(5);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_make_complement_and_combine() {
        let mut tree = RuleTree::parse("1 -2").unwrap();
        tree.make_complement();
        assert_eq!(tree.to_string(), "#(1 -2)");

        let mut a = RuleTree::parse("1").unwrap();
        a.add_union(&RuleTree::parse("2 3").unwrap());
        assert_eq!(a.to_string(), "1 : (2 3)");
        a.add_intersection(&RuleTree::parse("4").unwrap());
        assert_eq!(a.to_string(), "(1 : (2 3)) 4");
        assert!(a.is_consistent());

        let mut empty = RuleTree::new();
        empty.add_intersection(&RuleTree::parse("7").unwrap());
        assert_eq!(empty.to_string(), "7");
    }

    #[test]
    fn test_simplify() {
        let mut tree = RuleTree::parse("1 2").unwrap();
        let two = tree.find_key(2).unwrap();
        tree.replace_leaf(two, Rule::Constant(true));
        assert!(tree.simplify());
        assert_eq!(tree.to_string(), "1");

        let mut tree = RuleTree::parse("1 : 2").unwrap();
        let two = tree.find_key(2).unwrap();
        tree.replace_leaf(two, Rule::Constant(true));
        tree.simplify();
        assert!(matches!(tree.rule(tree.root().unwrap()), Some(Rule::Constant(true))));

        let mut tree = RuleTree::parse("3 #(1 2)").unwrap();
        for id in [1, 2] {
            let key = tree
                .surface_leaves()
                .into_iter()
                .find(|(_, l)| l.id == id)
                .map(|(k, _)| k)
                .unwrap();
            tree.replace_leaf(key, Rule::Constant(false));
        }
        tree.simplify();
        assert_eq!(tree.to_string(), "3");
        assert!(tree.is_consistent());
        assert!(!tree.simplify());
    }

    #[test]
    fn test_graft_between_arenas() {
        let source = RuleTree::parse("(1 : 2) -3").unwrap();
        let mut target = RuleTree::parse("9").unwrap();
        let key = target.graft_root(&source).unwrap();
        assert!(target.parent(key).is_none());
        let nine = target.find_key(9).unwrap();
        assert!(target.replace_subtree(nine, key));
        assert_eq!(target.to_string(), "(1 : 2) -3");
        assert!(target.is_consistent());
        assert_eq!(target.len(), 5);
    }

    #[test]
    fn test_surfaces_dedup() {
        let mut tree = RuleTree::parse("1 -2 #(1 2) 3").unwrap();
        let store = SurfaceStore::parse("1 px 0\n2 py 0\n3 pz 0").unwrap();
        tree.populate(&store).unwrap();
        let ids: Vec<i32> = tree.surfaces().iter().map(|s| s.id()).collect();
        assert_eq!(ids, tree.surface_ids());
        assert_eq!(ids.len(), 3);
    }
}
