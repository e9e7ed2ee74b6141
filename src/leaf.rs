//! Leaves: flat buckets of entries with their div masks.
//!
//! A leaf is also the whole storage of a [`DivList`](crate::DivList), which is
//! one unbounded leaf.

use std::cmp::Ordering;
use std::mem;
use std::ops::ControlFlow;

use crate::config::DivisorConfig;
use crate::mask::{DivMask, DivMaskCalculator};
use crate::node::Cut;

/// A monomial being searched for, with its mask computed once up front.
pub(crate) struct Query<'a, M: ?Sized> {
    pub monomial: &'a M,
    pub mask: DivMask,
}

pub(crate) struct Leaf<C: DivisorConfig> {
    entries: Vec<C::Entry>,
    /// Parallel to `entries`. Empty unless `C::USE_DIV_MASK`.
    masks: Vec<DivMask>,
    /// AND of `masks`. Only maintained with `C::USE_TREE_DIV_MASK`.
    mask: DivMask,
}

impl<C: DivisorConfig> Leaf<C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            masks: Vec::with_capacity(if C::USE_DIV_MASK { capacity } else { 0 }),
            mask: DivMask::FULL,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> &C::Entry {
        &self.entries[index]
    }

    pub(crate) fn entries(&self) -> &[C::Entry] {
        &self.entries
    }

    #[cfg(test)]
    pub(crate) fn masks(&self) -> &[DivMask] {
        &self.masks
    }

    /// Aggregate mask of the entries. [`DivMask::FULL`] when empty or when
    /// tree masks are off.
    #[inline]
    pub(crate) fn mask(&self) -> DivMask {
        self.mask
    }

    pub(crate) fn monomials<'a>(
        &'a self,
        conf: &'a C,
    ) -> impl Iterator<Item = &'a C::Monomial> + Clone + 'a {
        self.entries.iter().map(move |entry| conf.monomial(entry))
    }

    /// Appends without regard to order.
    pub(crate) fn push(&mut self, entry: C::Entry, mask: DivMask) {
        self.entries.push(entry);
        if C::USE_DIV_MASK {
            self.masks.push(mask);
        }
        if C::USE_TREE_DIV_MASK {
            self.mask.combine_and(mask);
        }
    }

    /// Inserts `entry`, after any entries that compare equal when `sorted`,
    /// otherwise at the end.
    pub(crate) fn insert(&mut self, conf: &C, entry: C::Entry, mask: DivMask, sorted: bool) {
        if !sorted {
            self.push(entry, mask);
            return;
        }
        let monomial = conf.monomial(&entry);
        let pos = self
            .entries
            .partition_point(|e| conf.compare(conf.monomial(e), monomial) != Ordering::Greater);
        self.entries.insert(pos, entry);
        if C::USE_DIV_MASK {
            self.masks.insert(pos, mask);
        }
        if C::USE_TREE_DIV_MASK {
            self.mask.combine_and(mask);
        }
    }

    /// Whether the aggregate allows any entry here to divide the query.
    #[inline]
    pub(crate) fn can_contain_divisor(&self, query: &Query<'_, C::Monomial>) -> bool {
        !C::USE_TREE_DIV_MASK || self.mask.can_divide(query.mask)
    }

    /// End of the range that can hold divisors of the query. In a sorted
    /// leaf, no entry comparing greater than the query divides it.
    fn candidate_end(&self, conf: &C, query: &Query<'_, C::Monomial>, sorted: bool) -> usize {
        if sorted {
            self.entries.partition_point(|e| {
                conf.compare(conf.monomial(e), query.monomial) != Ordering::Greater
            })
        } else {
            self.entries.len()
        }
    }

    #[inline]
    fn divides_query(&self, conf: &C, index: usize, query: &Query<'_, C::Monomial>) -> bool {
        (!C::USE_DIV_MASK || self.masks[index].can_divide(query.mask))
            && conf.divides(conf.monomial(&self.entries[index]), query.monomial)
    }

    /// Index of the first entry dividing the query.
    pub(crate) fn find_divisor(
        &self,
        conf: &C,
        query: &Query<'_, C::Monomial>,
        sorted: bool,
    ) -> Option<usize> {
        (0..self.candidate_end(conf, query, sorted)).find(|&i| self.divides_query(conf, i, query))
    }

    pub(crate) fn find_all_divisors<'a, F>(
        &'a self,
        conf: &C,
        query: &Query<'_, C::Monomial>,
        sorted: bool,
        visitor: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&'a C::Entry) -> ControlFlow<()>,
    {
        for i in 0..self.candidate_end(conf, query, sorted) {
            if self.divides_query(conf, i, query) && visitor(&self.entries[i]).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Removes every entry the query divides, handing each to `removed`.
    /// Kept entries stay in order. Returns the number removed.
    pub(crate) fn remove_multiples<F>(
        &mut self,
        conf: &C,
        query: &Query<'_, C::Monomial>,
        removed: &mut F,
    ) -> usize
    where
        F: FnMut(C::Entry),
    {
        let len = self.entries.len();
        let mut kept = 0;
        for i in 0..len {
            let is_multiple = (!C::USE_DIV_MASK || query.mask.can_divide(self.masks[i]))
                && conf.divides(query.monomial, conf.monomial(&self.entries[i]));
            if is_multiple {
                continue;
            }
            if i != kept {
                self.entries.swap(i, kept);
                if C::USE_DIV_MASK {
                    self.masks.swap(i, kept);
                }
            }
            kept += 1;
        }

        let count = len - kept;
        if count > 0 {
            for entry in self.entries.drain(kept..) {
                removed(entry);
            }
            self.masks.truncate(kept);
            self.recompute_mask();
        }
        count
    }

    /// Moves every entry on the strictly-greater side of `cut` into `other`,
    /// which must be empty. Both leaves keep their relative order.
    pub(crate) fn split_off(
        &mut self,
        conf: &C,
        cut: Cut<C::Exponent>,
        other: &mut Leaf<C>,
        scratch: &mut Vec<(C::Entry, DivMask)>,
    ) {
        debug_assert!(other.is_empty());
        debug_assert!(scratch.is_empty());

        while let Some(entry) = self.entries.pop() {
            let mask = self.masks.pop().unwrap_or_default();
            if cut.is_strictly_greater(conf.exponent(conf.monomial(&entry), cut.var)) {
                other.entries.push(entry);
                if C::USE_DIV_MASK {
                    other.masks.push(mask);
                }
            } else {
                scratch.push((entry, mask));
            }
        }
        other.entries.reverse();
        other.masks.reverse();
        while let Some((entry, mask)) = scratch.pop() {
            self.entries.push(entry);
            if C::USE_DIV_MASK {
                self.masks.push(mask);
            }
        }

        self.recompute_mask();
        other.recompute_mask();
    }

    /// Recomputes every stored mask after the calculator changed.
    pub(crate) fn refresh_masks(&mut self, conf: &C, calculator: &DivMaskCalculator<C::Exponent>) {
        if !C::USE_DIV_MASK {
            return;
        }
        self.masks.clear();
        let masks = self
            .entries
            .iter()
            .map(|entry| calculator.compute(conf, conf.monomial(entry)));
        self.masks.extend(masks);
        self.recompute_mask();
    }

    fn recompute_mask(&mut self) {
        if C::USE_TREE_DIV_MASK {
            self.mask = self.masks.iter().fold(DivMask::FULL, |mut agg, &m| {
                agg.combine_and(m);
                agg
            });
        }
    }

    /// Empties the leaf, moving each entry and its mask into `drain`. The
    /// buffers keep their capacity.
    pub(crate) fn drain_into<F>(&mut self, drain: &mut F)
    where
        F: FnMut(C::Entry, DivMask),
    {
        let mut masks = mem::take(&mut self.masks);
        let mut mask_iter = masks.drain(..);
        for entry in self.entries.drain(..) {
            drain(entry, mask_iter.next().unwrap_or_default());
        }
        drop(mask_iter);
        self.masks = masks;
        self.mask = DivMask::FULL;
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.masks.clear();
        self.mask = DivMask::FULL;
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.entries.capacity() * mem::size_of::<C::Entry>()
            + self.masks.capacity() * mem::size_of::<DivMask>()
    }

    #[cfg(test)]
    pub(crate) fn is_sorted(&self, conf: &C) -> bool {
        self.entries
            .windows(2)
            .all(|w| conf.compare(conf.monomial(&w[0]), conf.monomial(&w[1])) != Ordering::Greater)
    }
}
