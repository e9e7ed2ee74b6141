//! A flat list of entries: the simplest divisor query structure.
//!
//! Every query scans the whole list, with div masks to skip the exact check
//! for most entries. Useful as a baseline and for small inputs.

use std::fmt::{self, Write as _};
use std::mem;
use std::ops::ControlFlow;

use crate::config::{DivListOptions, DivisorConfig};
use crate::error::Result;
use crate::leaf::{Leaf, Query};
use crate::mask::{DivMask, DivMaskCalculator};

/// Entries in one vector, with the same interface as [`KDTree`](crate::KDTree).
///
/// ```rust
/// use divquery::{BasicConfig, DivList, DivListOptions};
///
/// let conf: BasicConfig<u32> = BasicConfig::new(2);
/// let mut list = DivList::new(conf, DivListOptions::default());
/// list.insert(vec![2, 0]);
/// list.insert(vec![0, 2]);
/// assert_eq!(list.find_divisor(&[1, 3]), Some(&vec![0, 2]));
/// ```
pub struct DivList<C: DivisorConfig> {
    conf: C,
    options: DivListOptions,
    list: Leaf<C>,
    calculator: DivMaskCalculator<C::Exponent>,
    changes_till_rebuild: usize,
}

impl<C: DivisorConfig> DivList<C> {
    pub fn new(conf: C, options: DivListOptions) -> Self {
        debug_assert!(
            options.validate(&conf).is_ok(),
            "invalid div list options: {:?}",
            options.validate(&conf)
        );
        Self::build_empty(conf, options)
    }

    pub fn try_new(conf: C, options: DivListOptions) -> Result<Self> {
        options.validate(&conf)?;
        Ok(Self::build_empty(conf, options))
    }

    pub fn from_entries<I>(conf: C, options: DivListOptions, entries: I) -> Self
    where
        I: IntoIterator<Item = C::Entry>,
    {
        let mut list = Self::new(conf, options);
        list.insert_all(entries);
        list
    }

    fn build_empty(conf: C, options: DivListOptions) -> Self {
        let calculator = DivMaskCalculator::new(&conf);
        let mut list = Self {
            conf,
            options,
            list: Leaf::with_capacity(0),
            calculator,
            changes_till_rebuild: 0,
        };
        list.reset_changes_till_rebuild();
        list
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn config(&self) -> &C {
        &self.conf
    }

    pub fn options(&self) -> &DivListOptions {
        &self.options
    }

    fn query<'q>(&self, monomial: &'q C::Monomial) -> Query<'q, C::Monomial> {
        Query {
            monomial,
            mask: self.entry_mask(monomial),
        }
    }

    fn entry_mask(&self, monomial: &C::Monomial) -> DivMask {
        if C::USE_DIV_MASK {
            self.calculator.compute(&self.conf, monomial)
        } else {
            DivMask::default()
        }
    }

    pub fn insert(&mut self, entry: C::Entry) {
        let mask = self.entry_mask(self.conf.monomial(&entry));
        self.list.insert(&self.conf, entry, mask, self.options.sort_on_insert);
        self.report_changes(1);
    }

    pub fn insert_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = C::Entry>,
    {
        for entry in entries {
            self.insert(entry);
        }
    }

    /// The first stored entry dividing `monomial`, or `None`.
    pub fn find_divisor(&self, monomial: &C::Monomial) -> Option<&C::Entry> {
        let query = self.query(monomial);
        if !self.list.can_contain_divisor(&query) {
            return None;
        }
        let index = self.list.find_divisor(&self.conf, &query, self.options.sort_on_insert)?;
        Some(self.list.entry(index))
    }

    pub fn find_all_divisors<'a, F>(&'a self, monomial: &C::Monomial, mut visitor: F)
    where
        F: FnMut(&'a C::Entry) -> ControlFlow<()>,
    {
        let query = self.query(monomial);
        if self.list.can_contain_divisor(&query) {
            let _ = self
                .list
                .find_all_divisors(&self.conf, &query, self.options.sort_on_insert, &mut visitor);
        }
    }

    pub fn divisors(&self, monomial: &C::Monomial) -> Vec<&C::Entry> {
        let mut out = Vec::new();
        self.find_all_divisors(monomial, |entry| {
            out.push(entry);
            ControlFlow::Continue(())
        });
        out
    }

    pub fn remove_multiples(&mut self, monomial: &C::Monomial) -> usize {
        self.remove_multiples_with(monomial, drop)
    }

    pub fn remove_multiples_with<F>(&mut self, monomial: &C::Monomial, mut removed: F) -> usize
    where
        F: FnMut(C::Entry),
    {
        let query = self.query(monomial);
        let count = self.list.remove_multiples(&self.conf, &query, &mut removed);
        if count > 0 {
            self.report_changes(count);
        }
        count
    }

    pub fn clear(&mut self) {
        self.list.clear();
        if C::USE_DIV_MASK {
            self.calculator.rebuild_default(&self.conf);
        }
        self.reset_changes_till_rebuild();
    }

    /// Recomputes the mask bit assignment from the stored entries.
    pub fn rebuild(&mut self) {
        if C::USE_DIV_MASK {
            self.calculator.rebuild(&self.conf, self.list.monomials(&self.conf));
            self.list.refresh_masks(&self.conf, &self.calculator);
            tracing::debug!(entries = self.len(), "rebuilt div list masks");
        }
        self.reset_changes_till_rebuild();
    }

    fn report_changes(&mut self, count: usize) {
        if !C::USE_DIV_MASK || self.options.rebuild.is_none() {
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
            self.changes_till_rebuild = policy.budget(self.len());
        }
    }

    /// Entries in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, C::Entry> {
        self.list.entries().iter()
    }

    pub fn name(&self) -> String {
        let mut name = String::from("DivList");
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
        name
    }

    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>() + self.list.memory_usage() + self.calculator.memory_usage()
    }
}

impl<C: DivisorConfig + fmt::Debug> fmt::Debug for DivList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DivList")
            .field("conf", &self.conf)
            .field("options", &self.options)
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, C: DivisorConfig> IntoIterator for &'a DivList<C> {
    type Item = &'a C::Entry;
    type IntoIter = std::slice::Iter<'a, C::Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
