//! Navigation over a tree's nodes.
//!
//! Leaves are ordered depth-first with the equal-or-less child first, the same
//! order queries visit them in. Moving between neighbouring leaves goes
//! through parent links, so a [`Walker`] only needs the arena and the root,
//! and the entry iterator built on it can run from both ends.

use crate::arena::{NodeArena, NodeId};
use crate::config::DivisorConfig;
use crate::node::Node;

pub(crate) struct Walker<'a, C: DivisorConfig> {
    arena: &'a NodeArena<C>,
    root: NodeId,
}

impl<C: DivisorConfig> Clone for Walker<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: DivisorConfig> Copy for Walker<'_, C> {}

impl<'a, C: DivisorConfig> Walker<'a, C> {
    pub(crate) fn new(arena: &'a NodeArena<C>, root: NodeId) -> Self {
        Self { arena, root }
    }

    pub(crate) fn first_leaf(&self) -> NodeId {
        self.leftmost_leaf(self.root)
    }

    pub(crate) fn last_leaf(&self) -> NodeId {
        self.rightmost_leaf(self.root)
    }

    fn leftmost_leaf(&self, mut node: NodeId) -> NodeId {
        while let Node::Interior(interior) = self.arena.node(node) {
            node = interior.equal_or_less();
        }
        node
    }

    fn rightmost_leaf(&self, mut node: NodeId) -> NodeId {
        while let Node::Interior(interior) = self.arena.node(node) {
            node = interior.strictly_greater();
        }
        node
    }

    /// The leaf after `leaf`, or `None` at the last one.
    pub(crate) fn next_leaf(&self, leaf: NodeId) -> Option<NodeId> {
        let mut node = leaf;
        loop {
            let parent = self.arena.parent(node)?;
            let interior = self.arena.interior(parent);
            if interior.equal_or_less() == node {
                return Some(self.leftmost_leaf(interior.strictly_greater()));
            }
            node = parent;
        }
    }

    /// The leaf before `leaf`, or `None` at the first one.
    pub(crate) fn prev_leaf(&self, leaf: NodeId) -> Option<NodeId> {
        let mut node = leaf;
        loop {
            let parent = self.arena.parent(node)?;
            let interior = self.arena.interior(parent);
            if interior.strictly_greater() == node {
                return Some(self.rightmost_leaf(interior.equal_or_less()));
            }
            node = parent;
        }
    }

    /// Every node, parents before children.
    pub(crate) fn preorder(&self) -> Preorder<'a, C> {
        Preorder {
            arena: self.arena,
            stack: vec![self.root],
        }
    }
}

pub(crate) struct Preorder<'a, C: DivisorConfig> {
    arena: &'a NodeArena<C>,
    stack: Vec<NodeId>,
}

impl<C: DivisorConfig> Iterator for Preorder<'_, C> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        if let Node::Interior(interior) = self.arena.node(node) {
            self.stack.push(interior.strictly_greater());
            self.stack.push(interior.equal_or_less());
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BasicConfig;
    use crate::node::{Cut, Interior};

    type Conf = BasicConfig<u32>;

    /// Builds `((a, b), c)` and returns the arena, root and leaves in order.
    fn small_tree() -> (NodeArena<Conf>, NodeId, [NodeId; 3]) {
        let mut arena: NodeArena<Conf> = NodeArena::new(2);
        let push_leaf = |arena: &mut NodeArena<Conf>| {
            let leaf = arena.new_leaf();
            arena.push(Node::Leaf(leaf), None)
        };
        let a = push_leaf(&mut arena);
        let b = push_leaf(&mut arena);
        let c = push_leaf(&mut arena);
        let cut = Cut { var: 0, threshold: 1 };
        let inner = arena.push(Node::Interior(Interior::new(cut, a, b)), None);
        let root = arena.push(Node::Interior(Interior::new(cut, inner, c)), None);
        arena.set_parent(a, Some(inner));
        arena.set_parent(b, Some(inner));
        arena.set_parent(inner, Some(root));
        arena.set_parent(c, Some(root));
        (arena, root, [a, b, c])
    }

    #[test]
    fn test_leaf_navigation() {
        let (arena, root, [a, b, c]) = small_tree();
        let walker = Walker::new(&arena, root);

        assert_eq!(walker.first_leaf(), a);
        assert_eq!(walker.last_leaf(), c);
        assert_eq!(walker.next_leaf(a), Some(b));
        assert_eq!(walker.next_leaf(b), Some(c));
        assert_eq!(walker.next_leaf(c), None);
        assert_eq!(walker.prev_leaf(c), Some(b));
        assert_eq!(walker.prev_leaf(b), Some(a));
        assert_eq!(walker.prev_leaf(a), None);
    }

    #[test]
    fn test_preorder() {
        let (arena, root, [a, b, c]) = small_tree();
        let walker = Walker::new(&arena, root);
        let order: Vec<NodeId> = walker.preorder().collect();
        let inner = arena.parent(a).unwrap();
        assert_eq!(order, vec![root, inner, a, b, c]);
    }

    #[test]
    fn test_single_leaf() {
        let mut arena: NodeArena<Conf> = NodeArena::new(2);
        let leaf = arena.new_leaf();
        let root = arena.push(Node::Leaf(leaf), None);
        let walker = Walker::new(&arena, root);
        assert_eq!(walker.first_leaf(), root);
        assert_eq!(walker.last_leaf(), root);
        assert_eq!(walker.next_leaf(root), None);
        assert_eq!(walker.preorder().count(), 1);
    }
}
