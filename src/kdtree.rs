//! The KD-tree divisor query structure.
//!
//! Entries live in leaves of a binary tree whose interior nodes each cut on
//! one variable. A query for divisors of `q` only needs to enter the
//! strictly-greater side of a cut when `q` itself is strictly greater there,
//! and a removal of multiples of `q` only needs to enter the equal-or-less
//! side when `q` is equal or less. Div masks on entries (and optionally
//! aggregated on nodes) reject most non-divisors without looking at
//! exponents.
//!
//! All traversals use explicit stacks, so a degenerate, deep tree costs heap
//! space but never native stack.

use std::cell::Cell;
use std::fmt::{self, Write as _};
use std::iter::FusedIterator;
use std::mem;
use std::ops::ControlFlow;

use smallvec::SmallVec;

use crate::arena::{NodeArena, NodeId};
use crate::config::{DivisorConfig, KDTreeOptions};
use crate::error::Result;
use crate::leaf::Query;
use crate::mask::{DivMask, DivMaskCalculator};
use crate::node::{choose_cut, Cut, Interior, Node};
use crate::walker::Walker;

/// Inline capacity of the query stack. Deeper trees spill to the heap.
const STACK_INLINE: usize = 32;

type NodeStack = SmallVec<[NodeId; STACK_INLINE]>;

#[derive(Clone, Copy, Debug)]
struct EntryLoc {
    leaf: NodeId,
    index: usize,
}

/// Where a node built by the bulk builder gets attached.
#[derive(Clone, Copy)]
enum Slot {
    Root,
    EqualOrLess(NodeId),
    StrictlyGreater(NodeId),
}

impl Slot {
    fn parent(self) -> Option<NodeId> {
        match self {
            Slot::Root => None,
            Slot::EqualOrLess(p) | Slot::StrictlyGreater(p) => Some(p),
        }
    }
}

struct BuildTask {
    start: usize,
    end: usize,
    slot: Slot,
    after_var: Option<usize>,
}

/// A KD-tree answering divisor queries over stored monomial entries.
///
/// ```rust
/// use divquery::{BasicConfig, KDTree, KDTreeOptions};
///
/// let conf: BasicConfig<u32> = BasicConfig::new(2);
/// let mut tree = KDTree::new(conf, KDTreeOptions::default());
/// tree.insert(vec![3, 2]);
/// tree.insert(vec![1, 4]);
///
/// assert_eq!(tree.find_divisor(&[5, 0]), None);
/// assert_eq!(tree.find_divisor(&[5, 2]), Some(&vec![3, 2]));
/// assert_eq!(tree.remove_multiples(&[1, 2]), 2);
/// assert!(tree.is_empty());
/// ```
pub struct KDTree<C: DivisorConfig> {
    conf: C,
    options: KDTreeOptions,
    arena: NodeArena<C>,
    root: NodeId,
    len: usize,
    calculator: DivMaskCalculator<C::Exponent>,
    divisor_cache: Cell<Option<EntryLoc>>,
    changes_till_rebuild: usize,
    /// Scratch for leaf splits.
    split_scratch: Vec<(C::Entry, DivMask)>,
    /// Interior nodes visited by the last removal.
    visited: Vec<NodeId>,
}

impl<C: DivisorConfig> KDTree<C> {
    /// An empty tree.
    ///
    /// The options must be valid for `conf`; this is only checked in debug
    /// builds. Use [`KDTree::try_new`] to check them always.
    pub fn new(conf: C, options: KDTreeOptions) -> Self {
        debug_assert!(
            options.validate(&conf).is_ok(),
            "invalid kd-tree options: {:?}",
            options.validate(&conf)
        );
        Self::build_empty(conf, options)
    }

    pub fn try_new(conf: C, options: KDTreeOptions) -> Result<Self> {
        options.validate(&conf)?;
        Ok(Self::build_empty(conf, options))
    }

    /// A tree holding `entries`, built in one pass.
    pub fn from_entries<I>(conf: C, options: KDTreeOptions, entries: I) -> Self
    where
        I: IntoIterator<Item = C::Entry>,
    {
        let mut tree = Self::new(conf, options);
        tree.insert_all(entries);
        tree
    }

    fn build_empty(conf: C, options: KDTreeOptions) -> Self {
        let mut arena = NodeArena::new(options.leaf_size);
        let leaf = arena.new_leaf();
        let root = arena.push(Node::Leaf(leaf), None);
        let calculator = DivMaskCalculator::new(&conf);
        let mut tree = Self {
            conf,
            options,
            arena,
            root,
            len: 0,
            calculator,
            divisor_cache: Cell::new(None),
            changes_till_rebuild: 0,
            split_scratch: Vec::new(),
            visited: Vec::new(),
        };
        tree.reset_changes_till_rebuild();
        tree
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn config(&self) -> &C {
        &self.conf
    }

    pub fn options(&self) -> &KDTreeOptions {
        &self.options
    }

    #[inline]
    fn entry_mask(&self, monomial: &C::Monomial) -> DivMask {
        if C::USE_DIV_MASK {
            self.calculator.compute(&self.conf, monomial)
        } else {
            DivMask::default()
        }
    }

    #[inline]
    fn query<'q>(&self, monomial: &'q C::Monomial) -> Query<'q, C::Monomial> {
        Query {
            monomial,
            mask: self.entry_mask(monomial),
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Stores `entry`. Duplicates are kept.
    pub fn insert(&mut self, entry: C::Entry) {
        let mask = self.entry_mask(self.conf.monomial(&entry));

        let mut parent: Option<NodeId> = None;
        let mut node = self.root;
        while let Node::Interior(interior) = self.arena.node_mut(node) {
            if C::USE_TREE_DIV_MASK {
                interior.update_to_lower_bound(mask);
            }
            parent = Some(node);
            let exponent = self.conf.exponent(self.conf.monomial(&entry), interior.var());
            node = interior.child_for(exponent);
        }

        if self.arena.leaf(node).len() >= self.options.leaf_size {
            let after_var = parent.map(|p| self.arena.interior(p).var());
            let monomial = self.conf.monomial(&entry);
            let leaf = self.arena.leaf(node);
            let cut = choose_cut(
                &self.conf,
                after_var,
                leaf.monomials(&self.conf).chain(std::iter::once(monomial)),
            );
            match cut {
                Some(cut) => {
                    let interior = self.split_leaf(node, parent, cut);
                    let interior = self.arena.interior_mut(interior);
                    if C::USE_TREE_DIV_MASK {
                        interior.update_to_lower_bound(mask);
                    }
                    node = interior.child_for(self.conf.exponent(monomial, cut.var));
                }
                None => {
                    tracing::trace!(
                        len = leaf.len(),
                        leaf_size = self.options.leaf_size,
                        "leaf of identical monomials grows past capacity"
                    );
                }
            }
        }

        debug_assert!(
            {
                let leaf = self.arena.leaf(node);
                let monomial = self.conf.monomial(&entry);
                leaf.len() < self.options.leaf_size
                    || leaf.monomials(&self.conf).all(|m| self.conf.compare(m, monomial).is_eq())
            },
            "full leaf of distinct monomials was not split"
        );
        let sorted = self.options.sort_on_insert;
        self.arena.leaf_mut(node).insert(&self.conf, entry, mask, sorted);
        self.len += 1;
        self.divisor_cache.set(None);
        self.report_changes(1);
    }

    /// Splits a full leaf in place. The leaf keeps the equal-or-less side and
    /// a new interior node takes its slot. Returns the interior node.
    fn split_leaf(
        &mut self,
        leaf: NodeId,
        parent: Option<NodeId>,
        cut: Cut<C::Exponent>,
    ) -> NodeId {
        let mut other = self.arena.new_leaf();
        self.arena
            .leaf_mut(leaf)
            .split_off(&self.conf, cut, &mut other, &mut self.split_scratch);

        let mut interior = Interior::new(cut, leaf, NodeId::NULL);
        if C::USE_TREE_DIV_MASK {
            interior.update_to_lower_bound(self.arena.leaf(leaf).mask());
            interior.update_to_lower_bound(other.mask());
        }
        let other = self.arena.push(Node::Leaf(other), None);
        interior.set_strictly_greater(other);
        let interior = self.arena.push(Node::Interior(interior), parent);
        self.arena.set_parent(leaf, Some(interior));
        self.arena.set_parent(other, Some(interior));
        match parent {
            None => self.root = interior,
            Some(p) => self.arena.interior_mut(p).replace_child(leaf, interior),
        }
        interior
    }

    /// Stores every entry. Into an empty tree this is a bulk build, which
    /// produces a better balanced tree than inserting one at a time.
    pub fn insert_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = C::Entry>,
    {
        if !self.is_empty() {
            for entry in entries {
                self.insert(entry);
            }
            return;
        }

        let buffer: Vec<(C::Entry, DivMask)> =
            entries.into_iter().map(|e| (e, DivMask::default())).collect();
        if buffer.is_empty() {
            return;
        }
        self.arena.free_all(|_, _| {});
        self.build(buffer);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Some stored entry whose monomial divides `monomial`, or `None`.
    ///
    /// Without the divisor cache the result is the first divisor in iteration
    /// order. With it, a previously returned entry that still divides wins.
    pub fn find_divisor(&self, monomial: &C::Monomial) -> Option<&C::Entry> {
        if self.options.use_divisor_cache {
            if let Some(loc) = self.divisor_cache.get() {
                let entry = self.arena.leaf(loc.leaf).entry(loc.index);
                if self.conf.divides(self.conf.monomial(entry), monomial) {
                    return Some(entry);
                }
            }
        }

        let loc = self.find_divisor_loc(&self.query(monomial))?;
        if self.options.use_divisor_cache {
            self.divisor_cache.set(Some(loc));
        }
        Some(self.arena.leaf(loc.leaf).entry(loc.index))
    }

    fn find_divisor_loc(&self, query: &Query<'_, C::Monomial>) -> Option<EntryLoc> {
        let sorted = self.options.sort_on_insert;
        let mut stack = NodeStack::new();
        let mut node = self.root;
        loop {
            match self.arena.node(node) {
                Node::Interior(interior) => {
                    if interior.can_contain_divisor(query, C::USE_TREE_DIV_MASK) {
                        let cut = interior.cut();
                        if cut.is_strictly_greater(self.conf.exponent(query.monomial, cut.var)) {
                            stack.push(interior.strictly_greater());
                        }
                        node = interior.equal_or_less();
                        continue;
                    }
                }
                Node::Leaf(leaf) => {
                    if leaf.can_contain_divisor(query) {
                        if let Some(index) = leaf.find_divisor(&self.conf, query, sorted) {
                            return Some(EntryLoc { leaf: node, index });
                        }
                    }
                }
            }
            node = stack.pop()?;
        }
    }

    /// Calls `visitor` on every stored entry dividing `monomial`, in iteration
    /// order, until it returns [`ControlFlow::Break`].
    pub fn find_all_divisors<'a, F>(&'a self, monomial: &C::Monomial, mut visitor: F)
    where
        F: FnMut(&'a C::Entry) -> ControlFlow<()>,
    {
        let query = self.query(monomial);
        let sorted = self.options.sort_on_insert;
        let mut stack = NodeStack::new();
        let mut node = self.root;
        loop {
            match self.arena.node(node) {
                Node::Interior(interior) => {
                    if interior.can_contain_divisor(&query, C::USE_TREE_DIV_MASK) {
                        let cut = interior.cut();
                        if cut.is_strictly_greater(self.conf.exponent(monomial, cut.var)) {
                            stack.push(interior.strictly_greater());
                        }
                        node = interior.equal_or_less();
                        continue;
                    }
                }
                Node::Leaf(leaf) => {
                    if leaf.can_contain_divisor(&query)
                        && leaf
                            .find_all_divisors(&self.conf, &query, sorted, &mut visitor)
                            .is_break()
                    {
                        return;
                    }
                }
            }
            match stack.pop() {
                Some(next) => node = next,
                None => return,
            }
        }
    }

    /// Every stored entry dividing `monomial`, in iteration order.
    pub fn divisors(&self, monomial: &C::Monomial) -> Vec<&C::Entry> {
        let mut out = Vec::new();
        self.find_all_divisors(monomial, |entry| {
            out.push(entry);
            ControlFlow::Continue(())
        });
        out
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes every entry whose monomial `monomial` divides. Returns how
    /// many were removed.
    pub fn remove_multiples(&mut self, monomial: &C::Monomial) -> usize {
        self.remove_multiples_with(monomial, drop)
    }

    /// Like [`KDTree::remove_multiples`], handing each removed entry to
    /// `removed`.
    pub fn remove_multiples_with<F>(&mut self, monomial: &C::Monomial, mut removed: F) -> usize
    where
        F: FnMut(C::Entry),
    {
        let query = self.query(monomial);
        let mut stack = NodeStack::new();
        self.visited.clear();
        let mut count = 0;
        let mut node = self.root;
        loop {
            match self.arena.node_mut(node) {
                Node::Interior(interior) => {
                    if self.conf.exponent(monomial, interior.var()) <= interior.threshold() {
                        stack.push(interior.equal_or_less());
                    }
                    if C::USE_TREE_DIV_MASK {
                        self.visited.push(node);
                    }
                    node = interior.strictly_greater();
                    continue;
                }
                Node::Leaf(leaf) => {
                    count += leaf.remove_multiples(&self.conf, &query, &mut removed);
                }
            }
            match stack.pop() {
                Some(next) => node = next,
                None => break,
            }
        }

        if count > 0 {
            // Every interior is visited before its descendants.
            for &id in self.visited.iter().rev() {
                let mask = self.arena.children_mask(id);
                self.arena.interior_mut(id).set_mask(mask);
            }
            self.len -= count;
            self.divisor_cache.set(None);
            self.report_changes(count);
        }
        count
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.arena.free_all(|_, _| {});
        let leaf = self.arena.new_leaf();
        self.root = self.arena.push(Node::Leaf(leaf), None);
        self.len = 0;
        if C::USE_DIV_MASK {
            self.calculator.rebuild_default(&self.conf);
        }
        self.divisor_cache.set(None);
        self.reset_changes_till_rebuild();
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    /// Rebuilds the tree and the mask bit assignment from the stored entries.
    /// Queries give the same answers afterwards, up to tie-breaking.
    pub fn rebuild(&mut self) {
        let mut buffer: Vec<(C::Entry, DivMask)> = Vec::with_capacity(self.len);
        self.arena.free_all(|entry, mask| buffer.push((entry, mask)));
        self.build(buffer);
    }

    fn report_changes(&mut self, count: usize) {
        if self.options.rebuild.is_none() {
            return;
        }
        if self.changes_till_rebuild > count {
            self.changes_till_rebuild -= count;
        } else {
            self.rebuild();
        }
    }

    fn reset_changes_till_rebuild(&mut self) {
        if let Some(policy) = self.options.rebuild {
            self.changes_till_rebuild = policy.budget(self.len);
        }
    }

    /// Bulk-builds the tree from `buffer` into the (emptied) arena.
    fn build(&mut self, mut buffer: Vec<(C::Entry, DivMask)>) {
        debug_assert_eq!(self.arena.len(), 0);
        let _span = tracing::debug_span!("kdtree::build", entries = buffer.len()).entered();

        if C::USE_DIV_MASK {
            let conf = &self.conf;
            self.calculator
                .rebuild(conf, buffer.iter().map(|(entry, _)| conf.monomial(entry)));
            for (entry, mask) in &mut buffer {
                *mask = self.calculator.compute(conf, conf.monomial(entry));
            }
        }

        self.len = buffer.len();
        let leaf_size = self.options.leaf_size;
        let sorted = self.options.sort_on_insert;
        let mut tasks = vec![BuildTask {
            start: 0,
            end: buffer.len(),
            slot: Slot::Root,
            after_var: None,
        }];

        // Strictly-greater ranges are built first, so every task finds its
        // range at the tail of the buffer and leaves drain it from there.
        while let Some(task) = tasks.pop() {
            debug_assert_eq!(task.end, buffer.len());
            let conf = &self.conf;
            let range = &mut buffer[task.start..task.end];
            let cut = if range.len() > leaf_size {
                let monomials = range.iter().map(|(entry, _)| conf.monomial(entry));
                choose_cut(conf, task.after_var, monomials)
            } else {
                None
            };

            let id = match cut {
                None => {
                    if range.len() > leaf_size {
                        tracing::trace!(
                            len = range.len(),
                            leaf_size,
                            "building oversized leaf of identical monomials"
                        );
                    }
                    if sorted {
                        range.sort_by(|a, b| {
                            conf.compare(conf.monomial(&a.0), conf.monomial(&b.0))
                        });
                    }
                    let mut leaf = self.arena.new_leaf();
                    for (entry, mask) in buffer.drain(task.start..) {
                        leaf.push(entry, mask);
                    }
                    self.arena.push(Node::Leaf(leaf), task.slot.parent())
                }
                Some(cut) => {
                    let greater = |entry: &C::Entry| {
                        cut.is_strictly_greater(conf.exponent(conf.monomial(entry), cut.var))
                    };
                    range.sort_by_key(|(entry, _)| greater(entry));
                    let middle = task.start + range.partition_point(|(entry, _)| !greater(entry));
                    let interior = Interior::new(cut, NodeId::NULL, NodeId::NULL);
                    let id = self.arena.push(Node::Interior(interior), task.slot.parent());
                    tasks.push(BuildTask {
                        start: task.start,
                        end: middle,
                        slot: Slot::EqualOrLess(id),
                        after_var: Some(cut.var),
                    });
                    tasks.push(BuildTask {
                        start: middle,
                        end: task.end,
                        slot: Slot::StrictlyGreater(id),
                        after_var: Some(cut.var),
                    });
                    id
                }
            };

            match task.slot {
                Slot::Root => self.root = id,
                Slot::EqualOrLess(p) => self.arena.interior_mut(p).set_equal_or_less(id),
                Slot::StrictlyGreater(p) => self.arena.interior_mut(p).set_strictly_greater(id),
            }
        }
        debug_assert!(buffer.is_empty());

        if C::USE_TREE_DIV_MASK {
            let order: Vec<NodeId> = Walker::new(&self.arena, self.root).preorder().collect();
            for &id in order.iter().rev() {
                if let Node::Interior(_) = self.arena.node(id) {
                    let mask = self.arena.children_mask(id);
                    self.arena.interior_mut(id).set_mask(mask);
                }
            }
        }

        self.divisor_cache.set(None);
        self.reset_changes_till_rebuild();
        tracing::debug!(entries = self.len, nodes = self.arena.len(), "built kd-tree");
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Iterates over all entries, leaf by leaf in query order.
    pub fn iter(&self) -> Iter<'_, C> {
        let walker = Walker::new(&self.arena, self.root);
        let last = walker.last_leaf();
        Iter {
            arena: &self.arena,
            walker,
            front: Some((walker.first_leaf(), 0)),
            back: Some((last, self.arena.leaf(last).len())),
            remaining: self.len,
        }
    }

    /// A short description of the structure and its settings, for benchmark
    /// output.
    pub fn name(&self) -> String {
        let mut name = format!("KDTree leaf:{}", self.options.leaf_size);
        if let Some(policy) = self.options.rebuild {
            let _ = write!(name, " autob:{}/{}", policy.ratio, policy.min);
        }
        if C::USE_TREE_DIV_MASK {
            name.push_str(" tree-dmask");
        } else if C::USE_DIV_MASK {
            name.push_str(" dmask");
        }
        if self.options.sort_on_insert {
            name.push_str(" sort");
        }
        if self.options.use_divisor_cache {
            name.push_str(" cache");
        }
        name
    }

    /// Approximate bytes held by the tree itself. Memory that entries own
    /// outside of themselves is not counted.
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>()
            + self.arena.memory_usage()
            + self.calculator.memory_usage()
            + self.split_scratch.capacity() * mem::size_of::<(C::Entry, DivMask)>()
            + self.visited.capacity() * mem::size_of::<NodeId>()
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Panics unless every structural invariant holds.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self)
    where
        C::Entry: fmt::Debug,
    {
        let conf = &self.conf;
        let walker = Walker::new(&self.arena, self.root);
        assert_eq!(self.arena.parent(self.root), None, "root has a parent");

        let mut reachable = 0;
        let mut entries = 0;
        for id in walker.preorder() {
            reachable += 1;
            match self.arena.node(id) {
                Node::Interior(interior) => {
                    assert!(interior.var() < conf.var_count());
                    for child in [interior.equal_or_less(), interior.strictly_greater()] {
                        assert!(!child.is_null(), "unset child of {id:?}");
                        assert_eq!(self.arena.parent(child), Some(id), "bad parent link");
                        if C::USE_TREE_DIV_MASK {
                            let child_mask = self.arena.node(child).aggregate_mask();
                            assert!(
                                interior.mask().can_divide(child_mask),
                                "interior mask too wide"
                            );
                        }
                    }
                }
                Node::Leaf(leaf) => {
                    entries += leaf.len();
                    if self.options.sort_on_insert {
                        assert!(leaf.is_sorted(conf), "unsorted leaf {id:?}");
                    }
                    if leaf.len() > self.options.leaf_size {
                        let first = conf.monomial(leaf.entry(0));
                        assert!(
                            leaf.monomials(conf).all(|m| conf.compare(m, first).is_eq()),
                            "over-full leaf of distinct monomials: {:?}",
                            leaf.entries()
                        );
                    }
                    if C::USE_DIV_MASK {
                        assert_eq!(leaf.masks().len(), leaf.len());
                        for (entry, &mask) in leaf.entries().iter().zip(leaf.masks()) {
                            let expected = self.calculator.compute(conf, conf.monomial(entry));
                            assert_eq!(mask, expected, "stale mask");
                            if C::USE_TREE_DIV_MASK {
                                assert!(leaf.mask().can_divide(mask), "leaf mask too wide");
                            }
                        }
                    }
                    // Every entry lies on the right side of every ancestor cut.
                    let mut child = id;
                    while let Some(parent) = self.arena.parent(child) {
                        let interior = self.arena.interior(parent);
                        let greater = interior.strictly_greater() == child;
                        let cut = interior.cut();
                        for m in leaf.monomials(conf) {
                            assert_eq!(
                                cut.is_strictly_greater(conf.exponent(m, cut.var)),
                                greater,
                                "entry on wrong side of {cut:?}"
                            );
                        }
                        child = parent;
                    }
                }
            }
        }
        assert_eq!(reachable, self.arena.len(), "unreachable nodes");
        assert_eq!(entries, self.len, "entry count");
    }
}

impl<C: DivisorConfig + fmt::Debug> fmt::Debug for KDTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KDTree")
            .field("conf", &self.conf)
            .field("options", &self.options)
            .field("len", &self.len)
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl<'a, C: DivisorConfig> IntoIterator for &'a KDTree<C> {
    type Item = &'a C::Entry;
    type IntoIter = Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`KDTree`].
pub struct Iter<'a, C: DivisorConfig> {
    arena: &'a NodeArena<C>,
    walker: Walker<'a, C>,
    /// Next leaf and index to yield from the front.
    front: Option<(NodeId, usize)>,
    /// Leaf and exclusive end index of the next entry from the back.
    back: Option<(NodeId, usize)>,
    remaining: usize,
}

impl<'a, C: DivisorConfig> Iterator for Iter<'a, C> {
    type Item = &'a C::Entry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (mut leaf, mut index) = self.front?;
        loop {
            let entries = self.arena.leaf(leaf).entries();
            if index < entries.len() {
                self.front = Some((leaf, index + 1));
                self.remaining -= 1;
                return Some(&entries[index]);
            }
            leaf = self.walker.next_leaf(leaf)?;
            index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<C: DivisorConfig> DoubleEndedIterator for Iter<'_, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (mut leaf, mut end) = self.back?;
        loop {
            if end > 0 {
                self.back = Some((leaf, end - 1));
                self.remaining -= 1;
                return Some(self.arena.leaf(leaf).entry(end - 1));
            }
            leaf = self.walker.prev_leaf(leaf)?;
            end = self.arena.leaf(leaf).len();
        }
    }
}

impl<C: DivisorConfig> ExactSizeIterator for Iter<'_, C> {}

impl<C: DivisorConfig> FusedIterator for Iter<'_, C> {}
