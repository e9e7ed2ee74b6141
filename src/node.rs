//! Tree nodes and cut selection.

use crate::arena::NodeId;
use crate::config::{DivisorConfig, Exponent};
use crate::leaf::{Leaf, Query};
use crate::mask::{exponent_range, DivMask};

/// Splits monomials on one variable: exponents up to `threshold` go to the
/// equal-or-less side, greater ones to the strictly-greater side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cut<X> {
    pub var: usize,
    pub threshold: X,
}

impl<X: Exponent> Cut<X> {
    #[inline]
    pub(crate) fn is_strictly_greater(&self, exponent: X) -> bool {
        exponent > self.threshold
    }
}

pub(crate) enum Node<C: DivisorConfig> {
    Leaf(Leaf<C>),
    Interior(Interior<C::Exponent>),
}

impl<C: DivisorConfig> Node<C> {
    /// AND of every entry mask below this node, if tree masks are on.
    #[inline]
    pub(crate) fn aggregate_mask(&self) -> DivMask {
        match self {
            Node::Leaf(leaf) => leaf.mask(),
            Node::Interior(interior) => interior.mask(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Interior<X> {
    cut: Cut<X>,
    equal_or_less: NodeId,
    strictly_greater: NodeId,
    mask: DivMask,
}

impl<X: Exponent> Interior<X> {
    pub(crate) fn new(cut: Cut<X>, equal_or_less: NodeId, strictly_greater: NodeId) -> Self {
        Self {
            cut,
            equal_or_less,
            strictly_greater,
            mask: DivMask::FULL,
        }
    }

    #[inline]
    pub(crate) fn cut(&self) -> Cut<X> {
        self.cut
    }

    #[inline]
    pub(crate) fn var(&self) -> usize {
        self.cut.var
    }

    #[inline]
    pub(crate) fn threshold(&self) -> X {
        self.cut.threshold
    }

    #[inline]
    pub(crate) fn equal_or_less(&self) -> NodeId {
        self.equal_or_less
    }

    #[inline]
    pub(crate) fn strictly_greater(&self) -> NodeId {
        self.strictly_greater
    }

    pub(crate) fn set_equal_or_less(&mut self, child: NodeId) {
        self.equal_or_less = child;
    }

    pub(crate) fn set_strictly_greater(&mut self, child: NodeId) {
        self.strictly_greater = child;
    }

    /// Points whichever child slot holds `old` at `new`.
    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) {
        if self.equal_or_less == old {
            self.equal_or_less = new;
        } else {
            debug_assert_eq!(self.strictly_greater, old);
            self.strictly_greater = new;
        }
    }

    /// The child a monomial with this exponent at [`Interior::var`] belongs to.
    #[inline]
    pub(crate) fn child_for(&self, exponent: X) -> NodeId {
        if self.cut.is_strictly_greater(exponent) {
            self.strictly_greater
        } else {
            self.equal_or_less
        }
    }

    #[inline]
    pub(crate) fn mask(&self) -> DivMask {
        self.mask
    }

    pub(crate) fn set_mask(&mut self, mask: DivMask) {
        self.mask = mask;
    }

    /// Narrows the aggregate to account for a new entry below.
    #[inline]
    pub(crate) fn update_to_lower_bound(&mut self, mask: DivMask) {
        self.mask.combine_and(mask);
    }

    #[inline]
    pub(crate) fn can_contain_divisor<M: ?Sized>(
        &self,
        query: &Query<'_, M>,
        use_tree_mask: bool,
    ) -> bool {
        !use_tree_mask || self.mask.can_divide(query.mask)
    }
}

/// Picks a cut separating `monomials` into two non-empty groups.
///
/// Variables are tried round-robin starting after `after_var` (the variable of
/// the parent cut), or at variable 0 for the root. The threshold is the
/// midpoint of the exponent range, so the maximum lands strictly greater and
/// the minimum lands equal-or-less. `None` when every variable is constant,
/// i.e. all monomials are identical.
pub(crate) fn choose_cut<'a, C, I>(
    conf: &C,
    after_var: Option<usize>,
    monomials: I,
) -> Option<Cut<C::Exponent>>
where
    C: DivisorConfig,
    C::Monomial: 'a,
    I: Iterator<Item = &'a C::Monomial> + Clone,
{
    let var_count = conf.var_count();
    let mut var = after_var.map_or(0, |v| (v + 1) % var_count);
    for _ in 0..var_count {
        if let Some((min, max)) = exponent_range(conf, var, monomials.clone()) {
            if min != max {
                return Some(Cut {
                    var,
                    threshold: C::Exponent::cut_midpoint(min, max),
                });
            }
        }
        var = (var + 1) % var_count;
    }
    None
}
