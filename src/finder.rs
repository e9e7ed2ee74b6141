//! The query interface shared by every structure.

use std::ops::ControlFlow;

use crate::config::DivisorConfig;
use crate::div_list::DivList;
use crate::kdtree::KDTree;

/// The entry type of a [`DivFinder`].
pub type EntryOf<F> = <<F as DivFinder>::Config as DivisorConfig>::Entry;

/// The monomial type of a [`DivFinder`].
pub type MonomialOf<F> = <<F as DivFinder>::Config as DivisorConfig>::Monomial;

/// A set of entries that can be searched for divisors of a monomial and
/// pruned of multiples of one.
///
/// Lets code such as benchmarks or a Gröbner basis loop stay generic over
/// [`KDTree`] and [`DivList`].
pub trait DivFinder: Sized {
    type Config: DivisorConfig;

    fn config(&self) -> &Self::Config;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, entry: EntryOf<Self>);

    fn find_divisor(&self, monomial: &MonomialOf<Self>) -> Option<&EntryOf<Self>>;

    fn find_all_divisors<F>(&self, monomial: &MonomialOf<Self>, visitor: F)
    where
        F: FnMut(&EntryOf<Self>) -> ControlFlow<()>;

    fn remove_multiples_with<F>(&mut self, monomial: &MonomialOf<Self>, removed: F) -> usize
    where
        F: FnMut(EntryOf<Self>);

    fn remove_multiples(&mut self, monomial: &MonomialOf<Self>) -> usize {
        self.remove_multiples_with(monomial, drop)
    }

    fn clear(&mut self);

    fn rebuild(&mut self);

    fn name(&self) -> String;

    fn memory_usage(&self) -> usize;

    /// Keeps the stored monomials an antichain: `entry` is dropped if some
    /// stored entry divides it, otherwise its multiples are removed and it is
    /// inserted. Returns whether it was inserted.
    fn insert_reduce(&mut self, entry: EntryOf<Self>) -> bool {
        let monomial = self.config().monomial(&entry);
        if self.find_divisor(monomial).is_some() {
            return false;
        }
        self.remove_multiples(monomial);
        self.insert(entry);
        true
    }
}

impl<C: DivisorConfig> DivFinder for KDTree<C> {
    type Config = C;

    fn config(&self) -> &C {
        KDTree::config(self)
    }

    fn len(&self) -> usize {
        KDTree::len(self)
    }

    fn insert(&mut self, entry: C::Entry) {
        KDTree::insert(self, entry)
    }

    fn find_divisor(&self, monomial: &C::Monomial) -> Option<&C::Entry> {
        KDTree::find_divisor(self, monomial)
    }

    fn find_all_divisors<F>(&self, monomial: &C::Monomial, visitor: F)
    where
        F: FnMut(&C::Entry) -> ControlFlow<()>,
    {
        KDTree::find_all_divisors(self, monomial, visitor)
    }

    fn remove_multiples_with<F>(&mut self, monomial: &C::Monomial, removed: F) -> usize
    where
        F: FnMut(C::Entry),
    {
        KDTree::remove_multiples_with(self, monomial, removed)
    }

    fn clear(&mut self) {
        KDTree::clear(self)
    }

    fn rebuild(&mut self) {
        KDTree::rebuild(self)
    }

    fn name(&self) -> String {
        KDTree::name(self)
    }

    fn memory_usage(&self) -> usize {
        KDTree::memory_usage(self)
    }
}

impl<C: DivisorConfig> DivFinder for DivList<C> {
    type Config = C;

    fn config(&self) -> &C {
        DivList::config(self)
    }

    fn len(&self) -> usize {
        DivList::len(self)
    }

    fn insert(&mut self, entry: C::Entry) {
        DivList::insert(self, entry)
    }

    fn find_divisor(&self, monomial: &C::Monomial) -> Option<&C::Entry> {
        DivList::find_divisor(self, monomial)
    }

    fn find_all_divisors<F>(&self, monomial: &C::Monomial, visitor: F)
    where
        F: FnMut(&C::Entry) -> ControlFlow<()>,
    {
        DivList::find_all_divisors(self, monomial, visitor)
    }

    fn remove_multiples_with<F>(&mut self, monomial: &C::Monomial, removed: F) -> usize
    where
        F: FnMut(C::Entry),
    {
        DivList::remove_multiples_with(self, monomial, removed)
    }

    fn clear(&mut self) {
        DivList::clear(self)
    }

    fn rebuild(&mut self) {
        DivList::rebuild(self)
    }

    fn name(&self) -> String {
        DivList::name(self)
    }

    fn memory_usage(&self) -> usize {
        DivList::memory_usage(self)
    }
}
