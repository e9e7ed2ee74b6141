//! Node storage for the KD-tree.
//!
//! All nodes of a tree live in one arena and refer to each other by
//! [`NodeId`], a 32-bit index. Nodes are never freed one at a time: the arena
//! is emptied as a whole on clear and rebuild. Emptied leaves keep their
//! buffers and are handed out again, so a rebuild does not go back to the
//! allocator for every leaf.

use std::mem;

use crate::config::DivisorConfig;
use crate::leaf::Leaf;
use crate::mask::DivMask;
use crate::node::{Interior, Node};

/// A 32-bit index into a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// Placeholder for a child slot that is about to be filled.
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);

    /// # Panics
    /// Panics if the index is >= 2^32 - 1.
    pub(crate) fn from_usize(index: usize) -> Self {
        assert!(index < u32::MAX as usize, "node arena too large");
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self == Self::NULL
    }
}

pub(crate) struct NodeArena<C: DivisorConfig> {
    nodes: Vec<Node<C>>,
    /// Parent of each node, parallel to `nodes`. `None` for the root.
    parents: Vec<Option<NodeId>>,
    /// Emptied leaves kept for reuse.
    spare: Vec<Leaf<C>>,
    leaf_capacity: usize,
}

impl<C: DivisorConfig> NodeArena<C> {
    pub(crate) fn new(leaf_capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            spare: Vec::new(),
            leaf_capacity,
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// An empty leaf, not yet part of the arena. Reuses a spare one if any.
    pub(crate) fn new_leaf(&mut self) -> Leaf<C> {
        match self.spare.pop() {
            Some(leaf) => leaf,
            None => Leaf::with_capacity(self.leaf_capacity),
        }
    }

    pub(crate) fn push(&mut self, node: Node<C>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::from_usize(self.nodes.len());
        self.nodes.push(node);
        self.parents.push(parent);
        id
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<C> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn leaf(&self, id: NodeId) -> &Leaf<C> {
        match self.node(id) {
            Node::Leaf(leaf) => leaf,
            Node::Interior(_) => unreachable!("node {id:?} is not a leaf"),
        }
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<C> {
        match self.node_mut(id) {
            Node::Leaf(leaf) => leaf,
            Node::Interior(_) => unreachable!("node {id:?} is not a leaf"),
        }
    }

    #[inline]
    pub(crate) fn interior(&self, id: NodeId) -> &Interior<C::Exponent> {
        match self.node(id) {
            Node::Interior(interior) => interior,
            Node::Leaf(_) => unreachable!("node {id:?} is not an interior node"),
        }
    }

    #[inline]
    pub(crate) fn interior_mut(&mut self, id: NodeId) -> &mut Interior<C::Exponent> {
        match self.node_mut(id) {
            Node::Interior(interior) => interior,
            Node::Leaf(_) => unreachable!("node {id:?} is not an interior node"),
        }
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.parents[id.index()] = parent;
    }

    /// AND of the aggregate masks of both children of an interior node.
    pub(crate) fn children_mask(&self, id: NodeId) -> DivMask {
        let interior = self.interior(id);
        let mut mask = self.node(interior.equal_or_less()).aggregate_mask();
        mask.combine_and(self.node(interior.strictly_greater()).aggregate_mask());
        mask
    }

    /// Frees every node at once, moving each stored entry into `drain`.
    pub(crate) fn free_all<F>(&mut self, mut drain: F)
    where
        F: FnMut(C::Entry, DivMask),
    {
        self.parents.clear();
        let nodes = mem::take(&mut self.nodes);
        for node in nodes {
            if let Node::Leaf(mut leaf) = node {
                leaf.drain_into(&mut drain);
                self.spare.push(leaf);
            }
        }
    }

    /// Bytes held by nodes, leaf buffers and spare leaves. Excludes anything
    /// entries own outside of themselves.
    pub(crate) fn memory_usage(&self) -> usize {
        let leaves: usize = self
            .nodes
            .iter()
            .map(|node| match node {
                Node::Leaf(leaf) => leaf.memory_usage(),
                Node::Interior(_) => 0,
            })
            .sum();
        let spare: usize = self.spare.iter().map(Leaf::memory_usage).sum();
        self.nodes.capacity() * mem::size_of::<Node<C>>()
            + self.parents.capacity() * mem::size_of::<Option<NodeId>>()
            + self.spare.capacity() * mem::size_of::<Leaf<C>>()
            + leaves
            + spare
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BasicConfig;
    use crate::node::Cut;

    type Conf = BasicConfig<u32, true, true>;

    #[test]
    fn test_push_and_links() {
        let mut arena: NodeArena<Conf> = NodeArena::new(4);
        let a = arena.new_leaf();
        let b = arena.new_leaf();
        let a = arena.push(Node::Leaf(a), None);
        let b = arena.push(Node::Leaf(b), None);
        let cut = Cut { var: 0, threshold: 3 };
        let root = arena.push(Node::Interior(Interior::new(cut, a, b)), None);
        arena.set_parent(a, Some(root));
        arena.set_parent(b, Some(root));

        assert_eq!(arena.len(), 3);
        assert_eq!(arena.parent(a), Some(root));
        assert_eq!(arena.parent(root), None);
        assert_eq!(arena.interior(root).equal_or_less(), a);
        assert!(arena.leaf(b).is_empty());
        assert_eq!(arena.children_mask(root), DivMask::FULL);
    }

    #[test]
    fn test_free_all_drains_and_recycles() {
        let mut arena: NodeArena<Conf> = NodeArena::new(4);
        let mut leaf = arena.new_leaf();
        leaf.push(vec![1, 2], DivMask::from_raw(0b01));
        leaf.push(vec![3, 4], DivMask::from_raw(0b11));
        arena.push(Node::Leaf(leaf), None);

        let mut drained = Vec::new();
        arena.free_all(|entry, mask| drained.push((entry, mask)));
        assert_eq!(arena.len(), 0);
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            drained,
            vec![
                (vec![1, 2], DivMask::from_raw(0b01)),
                (vec![3, 4], DivMask::from_raw(0b11)),
            ]
        );

        // The emptied leaf comes back with its buffer.
        let reused = arena.new_leaf();
        assert!(reused.is_empty());
        assert_eq!(reused.mask(), DivMask::FULL);
        assert!(reused.memory_usage() > 0);
    }

    #[test]
    fn test_null_id() {
        assert!(NodeId::NULL.is_null());
        assert!(!NodeId::from_usize(0).is_null());
        assert_eq!(NodeId::from_usize(7).index(), 7);
    }
}
